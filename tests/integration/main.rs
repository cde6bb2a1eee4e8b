//! End-to-end flows over the in-memory stores

mod desk_tests;

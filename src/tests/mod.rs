pub mod event_tests;

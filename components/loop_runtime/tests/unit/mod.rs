//! Unit test runner for loop_runtime

mod event_loop_test;

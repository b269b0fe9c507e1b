//! Contract test runner for loop_runtime

mod contract_test;

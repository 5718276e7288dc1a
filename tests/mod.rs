mod support;

mod handler_tests;

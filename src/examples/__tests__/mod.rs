mod error_test;
mod feature_test;
mod index_test;
mod masking_test;
mod reader_test;

pub mod function_callback;
pub mod function_calling_options;
pub mod input_type;

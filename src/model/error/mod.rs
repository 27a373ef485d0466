pub mod folder_errors;

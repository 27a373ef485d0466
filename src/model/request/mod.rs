pub mod folder_requests;

pub mod tracker_service;

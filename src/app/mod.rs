pub mod coach_service;

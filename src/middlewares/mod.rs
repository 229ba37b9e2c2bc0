pub mod role_guard;

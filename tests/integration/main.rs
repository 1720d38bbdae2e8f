//! End-to-end tests driving `SecurityCore` against in-memory adapters and
//! a manual clock.

mod helpers;

mod guard_test;
mod lockout_test;
mod login_test;
mod registration_test;
mod session_test;

//! End-to-end tests driving the xliff-sync binary against throwaway repositories

mod helpers;

#[cfg(unix)]
mod test_detect;
#[cfg(unix)]
mod test_init;
#[cfg(unix)]
mod test_run;
#[cfg(unix)]
mod test_update;

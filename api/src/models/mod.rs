pub mod overseerr;

//! Port definitions for network acquisition.
//!
//! Hexagonal-architecture port that abstracts the scanning backend so the
//! HTTP adapter, the simulator and test doubles can be swapped freely.

mod acquisition_port;

pub use acquisition_port::AcquisitionPort;

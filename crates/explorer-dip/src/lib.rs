//! Client for the Bundestag documentation API (DIP).
//!
//! Search ranking happens remotely; this crate only shapes requests and
//! decodes the heterogeneous records that come back.

pub mod catalogue;
pub mod client;
pub mod dataset;
pub mod document;
pub mod params;
pub mod person;

pub use catalogue::MetadataOptions;
pub use client::DipClient;
pub use dataset::Dataset;
pub use document::{Document, OneOrMany, SearchPage};
pub use params::{ParamValue, QueryParams, Scalar};
pub use person::{PersonPage, PersonRef};

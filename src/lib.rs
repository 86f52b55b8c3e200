// Clínica Dental
// Copyright 2025 The Clínica Dental Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! REST service to manage the operational data of a dental clinic: patients,
//! dentists, treatments, appointments, schedules, roles and settings.
//!
//! The code follows a layered architecture: `model` defines the domain data
//! types, `db` talks to the database, `driver` implements the business rules
//! and `rest` exposes the HTTP surface.  Errors float from the bottom layers
//! to the top via the `?` operator and become HTTP status codes in `rest`.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use crate::clocks::SystemClock;
use crate::db::Db;
use crate::driver::Driver;
use crate::model::Password;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub mod clocks;
pub mod db;
mod driver;
pub mod env;
pub mod model;
mod rest;

/// Instantiates all resources and serves the application on `addr`.
///
/// `default_password` is the password assigned to newly-created patients until
/// they change it themselves.
pub async fn serve(
    addr: SocketAddr,
    db: Box<dyn Db + Send + Sync>,
    default_password: Password,
) -> Result<(), Box<dyn Error>> {
    let driver =
        Driver::new(Arc::from(db), Arc::from(SystemClock::default()), default_password);
    let app = rest::app(driver);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Serving requests on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

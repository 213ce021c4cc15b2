// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// blattwerk-remote — Stand-ins for the hosted collaborators.
//
// The processing stub acknowledges operations after a simulated delay; the
// share registry issues, checks and revokes expiring share links.

pub mod integrity;
pub mod processing;
pub mod share;

pub use processing::{ProcessingRequest, ProcessingResponse, RemoteProcessor, simulated_latency};
pub use share::{Permission, ShareAccess, ShareRegistry, ShareRequest, ShareResponse};

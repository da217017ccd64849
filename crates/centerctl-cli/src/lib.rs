// Copyright 2025 centerctl Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # centerctl CLI
//!
//! Command-line client for the Control Center (volumes) and the Information
//! Center (accounts).
//!
//! Every subcommand maps to exactly one remote call: it parses its positional
//! arguments into a request, echoes the request, opens a connection, sends
//! it, prints the reply and exits. The `demo` subcommand chains calls to both
//! services into a guided walkthrough.
//!
//! ## Key Commands
//!
//! - `centerctl create-account 8020 alice secret 3`
//! - `centerctl create-volume 8010 vol123 16 1 42`
//! - `centerctl update-account 8020 alice 345678 2` (admin reset, no old password)
//! - `centerctl demo --settle-secs 5`
//! - `centerctl get-volume -- 8010 -5 1` (`--` lets values start with `-`)
//!
//! ## Exit Status
//!
//! `0` on success, `1` on any error. The error line starts with its kind:
//! `transport error`, `service error`, `invalid input` or `output error`.

pub mod commands;
pub mod demo;
pub mod output;

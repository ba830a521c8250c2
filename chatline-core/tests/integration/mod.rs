// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration Tests for Chatline Core
//!
//! These tests drive complete sessions: login over REST, the realtime
//! handshake, sending and reconciling messages, and recovery after drops.
//!
//! Run with: cargo test --test integration

#[path = "../common/mod.rs"]
mod common;

mod chat_workflow_test;
mod session_workflow_test;

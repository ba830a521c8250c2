// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies
//!
//! Reusable proptest strategies for property-based testing.

use std::time::Duration;

use chatline_core::network::ClientEnvelope;
use proptest::prelude::*;

/// Strategy for backoff bases between 10ms and 5s.
pub fn base_delay_strategy() -> impl Strategy<Value = Duration> {
    (10u64..5_000).prop_map(Duration::from_millis)
}

/// Strategy for backoff caps between 1s and 120s.
pub fn max_delay_strategy() -> impl Strategy<Value = Duration> {
    (1_000u64..120_000).prop_map(Duration::from_millis)
}

/// Strategy for user ids.
pub fn user_id_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

/// Strategy for message text, including unicode and JSON-special characters.
pub fn message_text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![".{1,200}", r#"[a-z"\\{}\[\]:, ]{1,50}"#]
}

/// Strategy for message ids.
pub fn message_id_strategy() -> impl Strategy<Value = String> {
    "m-[0-9a-f]{1,12}"
}

/// Strategy covering every outbound envelope variant.
pub fn client_envelope_strategy() -> impl Strategy<Value = ClientEnvelope> {
    prop_oneof![
        (user_id_strategy(), "[A-Za-z0-9._-]{1,40}")
            .prop_map(|(user, token)| ClientEnvelope::auth(&user, &token)),
        (
            user_id_strategy(),
            message_text_strategy(),
            "[0-9a-f-]{36}",
            proptest::option::of(message_id_strategy()),
        )
            .prop_map(|(to, text, client_id, reply)| {
                ClientEnvelope::chat(&to, &text, &client_id, reply.as_deref())
            }),
        message_id_strategy().prop_map(|id| ClientEnvelope::seen(&id)),
        (user_id_strategy(), any::<bool>())
            .prop_map(|(to, is_typing)| ClientEnvelope::typing(&to, is_typing)),
        (message_id_strategy(), user_id_strategy(), ".{1,8}")
            .prop_map(|(id, to, reaction)| ClientEnvelope::add_reaction(&id, &to, &reaction)),
        (message_id_strategy(), user_id_strategy())
            .prop_map(|(id, to)| ClientEnvelope::remove_reaction(&id, &to)),
    ]
}

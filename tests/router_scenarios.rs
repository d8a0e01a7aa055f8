//! End-to-end routing scenarios
//!
//! Drive `MessageRouter::handle` with an in-memory store, a manual clock and
//! a recording action pipeline.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use common::*;
use icarus_query::clock::ManualClock;
use icarus_query::config::RouterConfig;
use icarus_query::format::templates::{ACTION_FAILED, FAREWELL};
use icarus_query::intent::Intent;
use icarus_query::query::{DateRange, TenantId};
use icarus_query::router::{InboundMessage, MessageRouter, RouteMode};

const SENDER: &str = "+55 (62) 99999-1234";

struct Harness {
    router: MessageRouter,
    store: Arc<MemoryStore>,
    pipeline: Arc<RecordingPipeline>,
    clock: ManualClock,
    tenant: TenantId,
}

impl Harness {
    fn new(store: MemoryStore) -> Self {
        Self::with(store, RecordingPipeline::new(), RouterConfig::default())
    }

    fn with(store: MemoryStore, pipeline: Arc<RecordingPipeline>, config: RouterConfig) -> Self {
        // 10:00 in the default -03:00 business timezone
        let clock = ManualClock::new(chrono::Utc.with_ymd_and_hms(2026, 3, 10, 13, 0, 0).unwrap());
        let store = Arc::new(store);
        let router = MessageRouter::new(
            config,
            store.clone(),
            pipeline.clone(),
            Arc::new(clock.clone()),
        );
        Self {
            router,
            store,
            pipeline,
            clock,
            tenant: TenantId::new("fazenda-1"),
        }
    }

    fn message(&self, text: &str) -> InboundMessage {
        InboundMessage::new(SENDER, text, chrono::Utc::now())
    }
}

// =============================================================================
// QUERY PIPELINE
// =============================================================================

#[tokio::test]
async fn test_missing_item_is_reported_with_the_searched_term() {
    let h = Harness::new(MemoryStore::new());

    let reply = h.router.handle(&h.message("tem martelo?"), &h.tenant).await;

    assert_eq!(reply.mode, RouteMode::Query);
    assert_eq!(reply.intent, Some(Intent::FindItem));
    assert_eq!(
        reply.entities.as_ref().and_then(|e| e.item_name.as_deref()),
        Some("martelo")
    );
    let text = reply.reply.as_text().unwrap();
    assert!(text.contains("não encontrado"));
    assert!(text.contains("martelo"));
    assert!(h.pipeline.requests().is_empty());
}

#[tokio::test]
async fn test_found_item_ends_with_closing_prompt() {
    let data = TenantData {
        items: vec![item("Martelo de borracha", 3.0, "Almoxarifado")],
        ..Default::default()
    };
    let h = Harness::new(MemoryStore::new().with_tenant("fazenda-1", data));

    let reply = h.router.handle(&h.message("Tem martelo?"), &h.tenant).await;
    let text = reply.reply.as_text().unwrap();

    assert!(text.contains("*Martelo de borracha*: 3 un"));
    assert!(text.contains("📍 Almoxarifado"));
    assert!(text.ends_with("💬 _Posso ajudar com mais alguma coisa?_"));
}

#[tokio::test]
async fn test_monthly_consumption_covers_the_current_month() {
    let data = TenantData {
        readings: vec![
            reading("Aviários", date(2026, 3, 2), "07:00", 100.0),
            reading("Aviários", date(2026, 3, 5), "16:00", 50.0),
            reading("Recria", date(2026, 3, 3), "07:00", 160.0),
            reading("Recria", date(2026, 2, 27), "07:00", 999.0),
        ],
        ..Default::default()
    };
    let h = Harness::new(MemoryStore::new().with_tenant("fazenda-1", data));

    let reply = h
        .router
        .handle(&h.message("consumo de água do mês"), &h.tenant)
        .await;

    assert_eq!(reply.intent, Some(Intent::WaterMonthlyConsumption));
    assert_eq!(
        h.store.ranges(),
        vec![DateRange {
            first_day: date(2026, 3, 1),
            last_day: date(2026, 3, 31),
        }]
    );

    let text = reply.reply.as_text().unwrap();
    assert!(text.starts_with("💧 *CONSUMO DE ÁGUA - MARÇO DE 2026*"));
    assert!(text.contains("📊 *Recria*\n   💧 Total: *160,0m³*"));
    assert!(text.contains("📊 *Aviários*\n   💧 Total: *150,0m³*"));
    assert!(text.contains("💧 *TOTAL GERAL: 310,0m³*"));
}

#[tokio::test]
async fn test_query_uses_business_local_date() {
    let h = Harness::new(MemoryStore::new());
    // 01:30 UTC on April 1st is still March 31st at -03:00
    h.clock
        .set(chrono::Utc.with_ymd_and_hms(2026, 4, 1, 1, 30, 0).unwrap());

    h.router
        .handle(&h.message("consumo de água do mês"), &h.tenant)
        .await;

    assert_eq!(h.store.ranges()[0].first_day, date(2026, 3, 1));
}

#[tokio::test]
async fn test_store_failure_becomes_internal_error() {
    let h = Harness::new(MemoryStore::new().with_behavior(Behavior::Fail));

    let reply = h.router.handle(&h.message("OS pendentes"), &h.tenant).await;

    assert_eq!(reply.mode, RouteMode::Query);
    assert_eq!(reply.reply.as_text(), Some("⚠️ Erro interno. Tente novamente."));
}

// =============================================================================
// AGENT SESSIONS
// =============================================================================

#[tokio::test]
async fn test_activation_hands_message_to_action_pipeline() {
    let h = Harness::new(MemoryStore::new());
    let msg = h.message("Icarus, chegou 200 pregos");

    let reply = h.router.handle(&msg, &h.tenant).await;

    assert_eq!(reply.mode, RouteMode::Agent);
    assert_eq!(reply.intent, None);
    assert!(h.router.sessions().is_active(&msg.sender).await);
    assert!(h.store.calls().is_empty(), "query pipeline must not run");

    let requests = h.pipeline.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, "chegou 200 pregos");
    assert_eq!(requests[0].tenant, h.tenant);
    assert!(!requests[0].continuation);
    assert_eq!(reply.reply.as_text(), Some("✅ Registrado: chegou 200 pregos"));

    let agent = reply.agent.unwrap();
    assert!(agent.executed);
    assert_eq!(agent.tokens, 42);
}

#[tokio::test]
async fn test_active_session_continues_with_context() {
    let h = Harness::new(MemoryStore::new());

    h.router
        .handle(&h.message("icarus abrir OS bomba do poço"), &h.tenant)
        .await;
    h.clock.advance(chrono::Duration::minutes(5));
    let reply = h
        .router
        .handle(&h.message("tem martelo?"), &h.tenant)
        .await;

    assert_eq!(reply.mode, RouteMode::Agent);
    let requests = h.pipeline.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].continuation);
    assert_eq!(requests[1].text, "tem martelo?");
    assert_eq!(requests[1].context.len(), 1);
    assert_eq!(requests[1].context[0].user, "abrir OS bomba do poço");
}

#[tokio::test]
async fn test_touch_keeps_session_alive() {
    let h = Harness::new(MemoryStore::new());
    let msg = h.message("icarus registrar leitura");

    h.router.handle(&msg, &h.tenant).await;
    for _ in 0..3 {
        h.clock.advance(chrono::Duration::minutes(8));
        let reply = h.router.handle(&h.message("mais uma"), &h.tenant).await;
        assert_eq!(reply.mode, RouteMode::Agent);
    }
    assert!(h.router.sessions().is_active(&msg.sender).await);
}

#[tokio::test]
async fn test_expired_session_falls_back_to_queries() {
    let h = Harness::new(MemoryStore::new());
    let msg = h.message("icarus registrar leitura");

    h.router.handle(&msg, &h.tenant).await;
    h.clock.advance(chrono::Duration::minutes(11));

    let reply = h.router.handle(&h.message("tem martelo?"), &h.tenant).await;
    assert_eq!(reply.mode, RouteMode::Query);
    assert!(!h.router.sessions().is_active(&msg.sender).await);
    assert_eq!(h.pipeline.requests().len(), 1);
}

#[tokio::test]
async fn test_exit_closes_active_session() {
    let h = Harness::new(MemoryStore::new());
    let msg = h.message("icarus, baixa de 2 luvas");

    h.router.handle(&msg, &h.tenant).await;
    let reply = h.router.handle(&h.message("tchau"), &h.tenant).await;

    assert_eq!(reply.mode, RouteMode::Exit);
    assert_eq!(reply.intent, Some(Intent::Exit));
    assert_eq!(reply.reply.as_text(), Some(FAREWELL));
    assert!(!h.router.sessions().is_active(&msg.sender).await);
    assert!(h.router.sessions().get(&msg.sender).await.is_none());
    assert_eq!(h.pipeline.requests().len(), 1);
}

#[tokio::test]
async fn test_exit_without_session_still_says_farewell() {
    let h = Harness::new(MemoryStore::new());

    let reply = h.router.handle(&h.message("Obrigado!"), &h.tenant).await;

    assert_eq!(reply.mode, RouteMode::Exit);
    assert_eq!(reply.reply.as_text(), Some(FAREWELL));
    assert!(h.store.calls().is_empty());
}

#[tokio::test]
async fn test_action_timeout_answers_generic_error() {
    let config = RouterConfig {
        action_timeout: Duration::from_millis(20),
        ..RouterConfig::default()
    };
    let h = Harness::with(
        MemoryStore::new(),
        RecordingPipeline::slow(Duration::from_millis(500)),
        config,
    );
    let msg = h.message("icarus abrir OS");

    let reply = h.router.handle(&msg, &h.tenant).await;

    assert_eq!(reply.reply.as_text(), Some(ACTION_FAILED));
    assert!(h.router.sessions().context(&msg.sender).await.is_empty());
}

#[tokio::test]
async fn test_same_sender_messages_run_in_arrival_order() {
    let h = Harness::with(
        MemoryStore::new(),
        RecordingPipeline::slow(Duration::from_millis(30)),
        RouterConfig::default(),
    );
    let first = h.message("icarus abrir OS");
    let second = h.message("prioridade alta");

    let (a, b) = tokio::join!(
        h.router.handle(&first, &h.tenant),
        h.router.handle(&second, &h.tenant),
    );

    assert_eq!(a.mode, RouteMode::Agent);
    assert_eq!(b.mode, RouteMode::Agent);
    let requests = h.pipeline.requests();
    assert_eq!(requests[1].context.len(), 1);
}

#[tokio::test]
async fn test_senders_have_independent_sessions() {
    let h = Harness::new(MemoryStore::new());
    let other = InboundMessage::new("5511988887777", "tem martelo?", chrono::Utc::now());

    h.router
        .handle(&h.message("icarus abrir OS"), &h.tenant)
        .await;
    let reply = h.router.handle(&other, &h.tenant).await;

    assert_eq!(reply.mode, RouteMode::Query);
}

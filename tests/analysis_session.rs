//! End-to-end session behaviour against a scripted model client.

mod common;

use common::*;
use folio::{
    AnalysisSession, Content, FeatureKind, Graph, MockClient, ModelError, Notice, NoticeLevel,
    Role, SessionError, Surface,
};
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::test]
async fn each_feature_stores_the_content_shape_it_requires() {
    let (session, _client) = loaded_session(
        MockClient::available()
            .with_reply("A book about AI.")
            .with_reply("# AI\n## Machine learning")
            .with_reply(GRAPH_JSON)
            .with_reply(FAQ_JSON)
            .with_reply(TIMELINE_JSON)
            .with_reply("1. Data matters."),
    );

    // Replies are queued in catalog order
    for kind in FeatureKind::ALL {
        let result = session.analyze(kind).await.unwrap();
        assert!(!result.content.is_empty(), "{kind}");
        assert_eq!(result.content.family(), kind.content_family(), "{kind}");
        assert_eq!(result.title, kind.info().result_title);
    }
    assert_eq!(session.results().len(), FeatureKind::ALL.len());
}

#[tokio::test]
async fn faq_prose_reply_is_recovered_line_by_line() {
    let (session, _client) = loaded_session(MockClient::available().with_reply(FAQ_PROSE));

    let result = session.analyze(FeatureKind::Faq).await.unwrap();
    let Content::FaqList(items) = result.content else {
        panic!("expected faq list");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].question, "Who proposed the Turing test?");
    assert_eq!(items[1].answer, "Alan Turing. He did so in 1950.");
    assert!(items
        .iter()
        .all(|i| !i.question.is_empty() && !i.answer.is_empty()));
}

#[tokio::test]
async fn timeline_prose_reply_gets_one_entry_per_line() {
    let (session, _client) = loaded_session(MockClient::available().with_reply(TIMELINE_PROSE));

    let result = session.analyze(FeatureKind::Timeline).await.unwrap();
    let Content::TimelineList(items) = result.content else {
        panic!("expected timeline");
    };
    let events: Vec<&str> = items.iter().map(|i| i.event.as_str()).collect();
    assert_eq!(
        events,
        ["Turing proposes his test", "The term AI is coined", "Deep learning takes off"]
    );
    assert!(items.iter().all(|i| i.year == "2024"));
}

#[tokio::test]
async fn graph_prose_reply_falls_back_to_placeholder() {
    let (session, _client) = loaded_session(MockClient::available().with_reply(GRAPH_PROSE));

    let result = session.analyze(FeatureKind::KnowledgeGraph).await.unwrap();
    assert_eq!(result.content, Content::Graph(Graph::placeholder()));
    assert_eq!(result.title, "Knowledge Graph");
}

#[tokio::test]
async fn structured_graph_edges_resolve_to_nodes() {
    let (session, _client) = loaded_session(MockClient::available().with_reply(GRAPH_JSON));

    let result = session.analyze(FeatureKind::KnowledgeGraph).await.unwrap();
    let Content::Graph(graph) = result.content else {
        panic!("expected graph");
    };
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.unresolved_edges().count(), 0);
    assert_eq!(graph.node("3").map(|n| n.label.as_str()), Some("Alan Turing"));
}

#[tokio::test]
async fn prompt_carries_the_document_text() {
    let (session, client) = loaded_session(MockClient::available().with_reply("summary"));

    session.analyze(FeatureKind::Summary).await.unwrap();
    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].prompt.contains("Alan Turing proposed his famous test in 1950."));
    assert!(calls[0].history.is_empty());
}

#[tokio::test]
async fn failed_call_keeps_previous_result() {
    let (session, _client) = loaded_session(
        MockClient::available()
            .with_reply("first summary")
            .with_failure(ModelError::Connection("connection refused".to_string())),
    );

    session.analyze(FeatureKind::Summary).await.unwrap();
    let err = session.analyze(FeatureKind::Summary).await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
    assert_eq!(err.notice().level, NoticeLevel::Error);

    let kept = session.result(FeatureKind::Summary).unwrap();
    assert_eq!(kept.content, Content::PlainText("first summary".to_string()));
    assert!(!session.is_busy(FeatureKind::Summary));
}

#[tokio::test]
async fn analysis_without_document_never_calls_the_model() {
    let client = Arc::new(MockClient::available().with_reply("unused"));
    let session = AnalysisSession::new(client.clone());

    let err = session.analyze(FeatureKind::Faq).await.unwrap_err();
    assert!(matches!(err, SessionError::EmptyDocument));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn two_exchanges_append_four_turns_in_order() {
    let (session, client) = loaded_session(
        MockClient::available()
            .with_reply("  It is about AI.  ")
            .with_reply("Alan Turing."),
    );

    let first = session.ask("What is this book about?").await.unwrap();
    assert_eq!(first, "It is about AI.");
    session.ask("Who proposed the test?").await.unwrap();

    let roles: Vec<Role> = session.prior_turns().iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        [Role::Human, Role::Assistant, Role::Human, Role::Assistant]
    );

    // The second call saw the first exchange as context
    let calls = client.calls();
    assert!(calls[0].history.is_empty());
    assert_eq!(calls[1].history.len(), 2);
    assert_eq!(calls[1].history[1].text, "It is about AI.");
}

#[tokio::test]
async fn failed_question_leaves_history_untouched() {
    let (session, _client) = loaded_session(MockClient::unavailable());

    let err = session.ask("Anyone there?").await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
    assert!(session.prior_turns().is_empty());
    assert_eq!(session.transcript().len(), 1);
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let (session, client) = loaded_session(MockClient::available());

    let err = session.ask("   ").await.unwrap_err();
    assert!(matches!(err, SessionError::EmptyQuestion));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn loading_a_document_resets_results_and_chat() {
    let (session, _client) = loaded_session(
        MockClient::available()
            .with_reply("summary")
            .with_reply("answer"),
    );
    session.analyze(FeatureKind::Summary).await.unwrap();
    session.ask("question?").await.unwrap();

    session.load_document("other.txt", "A different document.");
    assert!(session.results().is_empty());
    assert!(session.prior_turns().is_empty());
    assert_eq!(session.document().unwrap().name, "other.txt");
}

#[tokio::test]
async fn reply_for_a_replaced_document_is_discarded() {
    let gate = Arc::new(Notify::new());
    let (session, client) = loaded_session(
        MockClient::available()
            .with_reply("summary of the first document")
            .with_gate(gate.clone()),
    );

    let task = {
        let session = session.clone();
        tokio::spawn(async move { session.analyze(FeatureKind::Summary).await })
    };
    while client.call_count() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(session.is_busy(FeatureKind::Summary));

    session.load_document("second.txt", "The second document.");
    gate.notify_one();

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, SessionError::Stale));
    assert!(session.result(FeatureKind::Summary).is_none());
    assert!(!session.is_busy(FeatureKind::Summary));
}

#[tokio::test]
async fn duplicate_request_on_a_busy_surface_is_rejected() {
    let gate = Arc::new(Notify::new());
    let (session, client) = loaded_session(
        MockClient::available()
            .with_reply("the summary")
            .with_gate(gate.clone()),
    );

    let task = {
        let session = session.clone();
        tokio::spawn(async move { session.analyze(FeatureKind::Summary).await })
    };
    while client.call_count() == 0 {
        tokio::task::yield_now().await;
    }

    let err = session.analyze(FeatureKind::Summary).await.unwrap_err();
    assert!(matches!(err, SessionError::Busy(Surface::Feature(FeatureKind::Summary))));
    assert_eq!(client.call_count(), 1);

    gate.notify_one();
    let result = task.await.unwrap().unwrap();
    assert_eq!(result.content, Content::PlainText("the summary".to_string()));
    assert!(session.result(FeatureKind::Summary).is_some());
}

#[tokio::test]
async fn chat_reply_after_clear_is_discarded() {
    let gate = Arc::new(Notify::new());
    let (session, client) = loaded_session(
        MockClient::available()
            .with_reply("late answer")
            .with_gate(gate.clone()),
    );

    let task = {
        let session = session.clone();
        tokio::spawn(async move { session.ask("What is this book about?").await })
    };
    while client.call_count() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(session.is_chat_busy());

    session.clear_chat();
    gate.notify_one();

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, SessionError::Stale));
    assert!(session.prior_turns().is_empty());
    assert_eq!(session.transcript().len(), 1);
    assert!(!session.is_chat_busy());
}

#[tokio::test]
async fn chat_works_again_after_clear() {
    let (session, client) = loaded_session(
        MockClient::available()
            .with_reply("first")
            .with_reply("second"),
    );

    session.ask("One?").await.unwrap();
    session.clear_chat();
    let answer = session.ask("Two?").await.unwrap();

    assert_eq!(answer, "second");
    assert_eq!(session.prior_turns().len(), 2);
    assert!(client.calls()[1].history.is_empty());
}

#[tokio::test]
async fn analysis_outcome_maps_to_a_notice() {
    let (session, _client) = loaded_session(
        MockClient::available()
            .with_reply(TIMELINE_JSON)
            .with_failure(ModelError::Connection("refused".to_string())),
    );

    let outcome = session.analyze(FeatureKind::Timeline).await;
    let notice = Notice::for_analysis(FeatureKind::Timeline, &outcome);
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.title, "Timeline ready");

    let outcome = session.analyze(FeatureKind::Timeline).await;
    let notice = Notice::for_analysis(FeatureKind::Timeline, &outcome);
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.title, "Could not connect");
}

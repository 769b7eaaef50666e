use std::{
    sync::{atomic::Ordering, Arc, Mutex},
    time::{Duration, Instant},
};

use bot_arena::{
    fetch::{fetch_moves, FetchStatus, MoveRequest},
    prelude::*,
};
use bots::*;


fn init_test_logger() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::test]
async fn passive_bots_draw_at_the_turn_limit() {
    init_test_logger();
    let (p1_hits, p2_hits) = (Arc::default(), Arc::default());
    let p1 = spawn(passive(Arc::clone(&p1_hits))).await;
    let p2 = spawn(passive(Arc::clone(&p2_hits))).await;
    let (arena, sink) = arena(quick_settings(2, 5), false);

    let outcome = arena
        .play(Pairing::new(Bot::new("a", p1), Bot::new("b", p2)), Painter)
        .await
        .unwrap();

    assert_eq!(outcome.turns_elapsed, 5);
    assert_eq!(outcome.final_state.turns_elapsed, 5);
    assert!(outcome.is_draw());
    assert_eq!(p1_hits.load(Ordering::SeqCst), 5);
    assert_eq!(p2_hits.load(Ordering::SeqCst), 5);

    let published = sink.published.lock().unwrap();
    assert_eq!(published.len(), 6, "one publish per turn plus the final one");
    assert!(published.iter().all(|p| p.alert.is_none()));
    assert!(published.iter().all(|p| p.state.winner.is_none()));
    assert!(published.iter().all(|p| p.match_id == outcome.match_id));
    assert!(published.iter().all(|p| p.state.turns_elapsed <= 5));
    assert_eq!(sink.persisted.lock().unwrap().as_slice(), &[outcome]);
}

#[tokio::test]
async fn erroring_bot_is_disqualified_on_the_first_turn() {
    let (p1_hits, p2_hits) = (Arc::default(), Arc::default());
    let p1 = spawn(passive(Arc::clone(&p1_hits))).await;
    let p2 = spawn(broken(Arc::clone(&p2_hits))).await;
    let (arena, sink) = arena(quick_settings(2, 50), false);

    let outcome = arena
        .play(Pairing::new(Bot::new("a", p1), Bot::new("b", p2)), Painter)
        .await
        .unwrap();

    assert_eq!(outcome.winner, Some(ParticipantId::P1));
    assert_eq!(outcome.winning_participant().unwrap().name, "a");
    assert_eq!(outcome.turns_elapsed, 1);
    assert_eq!(p1_hits.load(Ordering::SeqCst), 1);
    assert_eq!(p2_hits.load(Ordering::SeqCst), 1);

    let published = sink.published.lock().unwrap();
    assert_eq!(published.len(), 2);
    let alert = published[0].alert.as_deref().unwrap();
    assert!(alert.contains("p2 returned an error"));
    assert!(alert.contains("500"));
    assert!(!alert.contains("p1"));
    assert_eq!(published[0].state.winner, Some(ParticipantId::P1));
}

#[tokio::test]
async fn garbled_answer_is_disqualifying() {
    let p1 = spawn(garbled()).await;
    let p2 = spawn(claimer(vec![])).await;
    let (arena, sink) = arena(quick_settings(3, 50), false);

    let outcome = arena
        .play(Pairing::new(Bot::new("a", p1), Bot::new("b", p2)), Painter)
        .await
        .unwrap();

    assert_eq!(outcome.winner, Some(ParticipantId::P2));
    assert_eq!(outcome.turns_elapsed, 1);
    let alert = sink.published.lock().unwrap()[0].alert.clone().unwrap();
    assert!(alert.contains("p1 returned an error"));
    assert!(alert.contains("malformed move list"));
}

#[tokio::test]
async fn double_fault_does_not_end_the_match() {
    let p1 = spawn(broken(Arc::default())).await;
    let p2 = spawn(broken(Arc::default())).await;
    let (arena, sink) = arena(quick_settings(2, 4), false);

    let outcome = arena
        .play(Pairing::new(Bot::new("a", p1), Bot::new("b", p2)), Painter)
        .await
        .unwrap();

    assert_eq!(outcome.turns_elapsed, 4);
    assert!(outcome.is_draw());
    let published = sink.published.lock().unwrap();
    for turn in &published[..4] {
        let alert = turn.alert.as_deref().unwrap();
        assert!(alert.contains("p1 returned an error"));
        assert!(alert.contains("p2 returned an error"));
        assert_eq!(turn.state.winner, None);
    }
}

#[tokio::test]
async fn sleeping_bot_times_out_without_disqualification() {
    let p1 = spawn(asleep()).await;
    let p2 = spawn(claimer(vec![0])).await;
    let (arena, sink) = arena(quick_settings(2, 2), false);

    let started = Instant::now();
    let outcome = arena
        .play(Pairing::new(Bot::new("a", p1), Bot::new("b", p2)), Painter)
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(600));
    assert_eq!(outcome.turns_elapsed, 2);
    // p1 played no moves, p2 holds one cell
    assert_eq!(outcome.winner, Some(ParticipantId::P2));
    assert_eq!(outcome.final_state.grid, "2...");
    assert!(sink
        .published
        .lock()
        .unwrap()
        .iter()
        .all(|p| p.alert.is_none()));
}

#[tokio::test]
async fn turn_limit_is_decided_by_cell_count() {
    let p1 = spawn(claimer(vec![0, 1])).await;
    let p2 = spawn(claimer(vec![3])).await;
    let (arena, _sink) = arena(quick_settings(2, 3), false);

    let outcome = arena
        .play(Pairing::new(Bot::new("a", p1), Bot::new("b", p2)), Painter)
        .await
        .unwrap();

    assert_eq!(outcome.turns_elapsed, 3);
    assert_eq!(outcome.final_state.grid, "11.2");
    assert_eq!(outcome.winner, Some(ParticipantId::P1));
}

#[tokio::test]
async fn turns_respect_the_minimum_duration() {
    let p1 = spawn(claimer(vec![])).await;
    let p2 = spawn(claimer(vec![])).await;
    let (arena, _sink) = arena(
        quick_settings(2, 4).with_min_turn_duration(Duration::from_millis(60)),
        false,
    );

    let started = Instant::now();
    let outcome = arena
        .play(Pairing::new(Bot::new("a", p1), Bot::new("b", p2)), Painter)
        .await
        .unwrap();

    assert_eq!(outcome.turns_elapsed, 4);
    assert!(started.elapsed() >= Duration::from_millis(240));
}

#[tokio::test]
async fn bots_receive_the_state_they_can_round_trip() {
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let p1 = spawn(recorder(Arc::clone(&bodies))).await;
    let p2 = spawn(claimer(vec![2])).await;
    let (arena, _sink) = arena(quick_settings(2, 2), true);

    let outcome = arena
        .play(Pairing::new(Bot::new("a", p1), Bot::new("b", p2)), Painter)
        .await
        .unwrap();

    let bodies = bodies.lock().unwrap();
    // two turns plus the final notification
    assert_eq!(bodies.len(), 3);
    for body in bodies.iter() {
        let request: MoveRequest = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(request.player, ParticipantId::P1);
        assert_eq!(&serde_json::to_value(&request).unwrap(), body);
    }

    let last: MoveRequest = serde_json::from_value(bodies[2].clone()).unwrap();
    assert_eq!(&*last.state, &outcome.final_state);
    assert_eq!(last.state.winner, Some(ParticipantId::P2));
    assert_eq!(bodies[0]["state"]["turnsElapsed"], 0);
    assert_eq!(bodies[1]["state"]["turnsElapsed"], 1);
}

#[tokio::test]
async fn fetch_classifies_each_kind_of_answer() {
    let settings = quick_settings(2, 1).build().unwrap();
    let pool = bot_arena::connection_pool::ConnectionPool::new(&settings);
    let state = MatchState::initial(2, 1);
    let timeout = settings.request_timeout();

    let seat = |url: String| {
        bot_arena::participant::Participant::new(ParticipantId::P1, Bot::new("bot", url))
    };

    let ok = seat(spawn(claimer(vec![1, 2])).await);
    let outcome = fetch_moves::<Claim>(&pool, &ok, &state, timeout).await;
    assert_eq!(outcome.status, FetchStatus::Ok);
    assert_eq!(outcome.moves.moves.len(), 2);
    assert!(pool.is_cached(&ok.endpoint));

    let broken = seat(spawn(broken(Arc::default())).await);
    let outcome = fetch_moves::<Claim>(&pool, &broken, &state, timeout).await;
    assert_eq!(
        outcome.status,
        FetchStatus::Error(bot_arena::error::OpponentFault::Status(500))
    );
    assert!(outcome.moves.is_empty());

    let garbled = seat(spawn(garbled()).await);
    let outcome = fetch_moves::<Claim>(&pool, &garbled, &state, timeout).await;
    assert!(matches!(
        outcome.status,
        FetchStatus::Error(bot_arena::error::OpponentFault::Malformed(_))
    ));

    let unreachable = seat("http://127.0.0.1:1/moves".to_owned());
    let outcome = fetch_moves::<Claim>(&pool, &unreachable, &state, timeout).await;
    assert!(matches!(
        outcome.status,
        FetchStatus::Error(bot_arena::error::OpponentFault::Transport(_))
    ));

    let asleep = seat(spawn(asleep()).await);
    let started = Instant::now();
    let outcome = fetch_moves::<Claim>(&pool, &asleep, &state, timeout).await;
    assert_eq!(outcome.status, FetchStatus::Timeout);
    assert!(outcome.moves.is_empty());
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn arena_plays_matches_concurrently() {
    let passive_url = spawn(passive(Arc::default())).await;
    let claimer_url = spawn(claimer(vec![0])).await;
    let broken_url = spawn(broken(Arc::default())).await;
    let (arena, sink) = arena(
        quick_settings(2, 3).with_min_turn_duration(Duration::from_millis(100)),
        false,
    );

    let pairings = vec![
        Pairing::new(
            Bot::new("passive", passive_url.clone()),
            Bot::new("claimer", claimer_url.clone()),
        ),
        Pairing::new(
            Bot::new("broken", broken_url),
            Bot::new("passive", passive_url.clone()),
        ),
        Pairing::new(
            Bot::new("claimer", claimer_url.clone()),
            Bot::new("passive", passive_url.clone()),
        ),
    ];

    let started = Instant::now();
    let results = arena.play_all(pairings.clone(), &PainterFactory).await;
    // three turns of 100ms each, not nine
    assert!(started.elapsed() < Duration::from_millis(900));

    assert_eq!(results.len(), 3);
    for ((pairing, _), expected) in results.iter().zip(&pairings) {
        assert_eq!(pairing, expected);
    }
    let winners = results
        .iter()
        .map(|(_, r)| r.as_ref().unwrap().winner)
        .collect::<Vec<_>>();
    assert_eq!(
        winners,
        vec![
            Some(ParticipantId::P2),
            Some(ParticipantId::P2),
            Some(ParticipantId::P1)
        ]
    );
    assert_eq!(results[1].1.as_ref().unwrap().turns_elapsed, 1);
    assert_eq!(sink.persisted.lock().unwrap().len(), 3);
    assert!(arena.pool().is_cached(&passive_url));
    assert!(arena.pool().is_cached(&claimer_url));
}

#[tokio::test]
async fn final_state_is_sent_to_both_bots() {
    let (p1_hits, p2_hits) = (Arc::default(), Arc::default());
    let p1 = spawn(passive(Arc::clone(&p1_hits))).await;
    let p2 = spawn(passive(Arc::clone(&p2_hits))).await;
    let (arena, _sink) = arena(quick_settings(3, 2), true);

    arena
        .play(Pairing::new(Bot::new("a", p1), Bot::new("b", p2)), Painter)
        .await
        .unwrap();

    assert_eq!(p1_hits.load(Ordering::SeqCst), 3);
    assert_eq!(p2_hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn injected_pool_does_not_override_the_request_timeout() {
    let p1 = spawn(asleep()).await;
    let p2 = spawn(passive(Arc::default())).await;
    let lenient = quick_settings(2, 1)
        .with_request_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let pool = Arc::new(bot_arena::connection_pool::ConnectionPool::new(&lenient));
    let (arena, _sink) = arena(quick_settings(2, 1), false);
    let arena = arena.with_pool(pool);

    let started = Instant::now();
    let outcome = arena
        .play(Pairing::new(Bot::new("a", p1), Bot::new("b", p2)), Painter)
        .await
        .unwrap();

    // one turn bounded by the arena's 300ms, not the pool's 5s
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(outcome.turns_elapsed, 1);
    assert!(outcome.is_draw());
}

//! End-to-end tests through the arena facade: wallet sign-in, season
//! administration, auditions, the stage and judging. Most run on in-memory
//! storage with a controllable clock; one reopens an LMDB node.

use std::sync::Arc;

use agt_crypto::{derive_address, keypair_from_seed, sign_message};
use agt_node::{
    ActivateRequest, AdvanceRequest, Arena, ArenaNode, AuditionRequest, CreateSeasonRequest,
    DecisionRequest, GrantAdminRequest, JudgeRegistrationRequest, JudgeRequest, NodeConfig,
    PerformanceRequest, RedeemRequest, RegisterRequest, ScoreRequest, SeedQueueRequest,
    StageRequest,
};
use agt_nullables::{NullClock, NullStore};
use agt_stage::{AutoAdvance, TickOutcome};
use agt_types::{
    AuditionStatus, ErrorCode, FailureClass, KeyPair, QueueStatus, Role, SeasonPhase,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const START: u64 = 1_700_000_000;
const DAY: u64 = 86_400;

struct Harness {
    clock: Arc<NullClock>,
    arena: Arc<Arena>,
    node: ArenaNode,
}

fn wallet(seed: u8) -> (KeyPair, String) {
    let keys = keypair_from_seed(&[seed; 32]);
    let address = derive_address(&keys.public).as_str().to_string();
    (keys, address)
}

fn harness() -> Harness {
    let (_, root) = wallet(1);
    let config = NodeConfig {
        super_admins: vec![root],
        session_secret: Some("ab".repeat(32)),
        ..Default::default()
    };
    let clock = Arc::new(NullClock::new(START));
    let node = ArenaNode::with_store(config, Arc::new(NullStore::new()), clock.clone())
        .expect("node builds");
    Harness {
        clock,
        arena: node.arena.clone(),
        node,
    }
}

/// Sign in with the wallet derived from `seed` and return its bearer token.
fn login(arena: &Arena, seed: u8) -> String {
    let (keys, address) = wallet(seed);
    let challenge = arena.issue_challenge(&address).expect("challenge");
    let signature = sign_message(challenge.message.as_bytes(), &keys.private).to_hex();
    arena
        .redeem_challenge(RedeemRequest { address, signature })
        .expect("redeem")
        .token
}

fn audition(season: &str, name: &str) -> AuditionRequest {
    AuditionRequest {
        season_id: season.to_string(),
        display_name: Some(name.to_string()),
        category: "comedy".into(),
        title: format!("{name} tries stand-up"),
        content: "knock knock".into(),
    }
}

fn stage(episode: u8, min_scores: Option<u32>) -> StageRequest {
    StageRequest {
        episode: Some(episode),
        min_scores,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn full_season_walkthrough() {
    let h = harness();
    let arena = &h.arena;
    let root = login(arena, 1);

    // Admin creates and activates a season.
    let season = arena
        .create_season(
            Some(&root),
            CreateSeasonRequest {
                name: "Season One".into(),
                description: None,
            },
        )
        .unwrap();
    let sid = season.id.to_string();
    let season = arena
        .activate_season(Some(&root), &sid, ActivateRequest::default())
        .unwrap();
    assert_eq!(season.phase, SeasonPhase::AuditionsOpen);
    assert_eq!(arena.current_season().unwrap().unwrap().id, season.id);

    // Two agents audition and are accepted.
    let alice = login(arena, 10);
    let bob = login(arena, 11);
    let a = arena.submit_audition(Some(&alice), audition(&sid, "alice")).unwrap();
    let b = arena.submit_audition(Some(&bob), audition(&sid, "bob")).unwrap();
    for receipt in [&a, &b] {
        let decided = arena
            .decide_audition(
                Some(&root),
                &sid,
                DecisionRequest {
                    audition_id: receipt.audition.id.to_string(),
                    status: "accepted".into(),
                    notes: None,
                },
            )
            .unwrap();
        assert_eq!(decided.status, AuditionStatus::Accepted);
    }
    assert_eq!(arena.list_auditions(Some(&root), &sid).unwrap().len(), 2);

    // Two judges join the roster.
    let judge_tokens: Vec<String> = [20u8, 21].iter().map(|s| login(arena, *s)).collect();
    for seed in [20u8, 21] {
        arena
            .add_judge(
                Some(&root),
                &sid,
                JudgeRequest {
                    address: wallet(seed).1,
                    specializations: vec!["Comedy".into()],
                },
            )
            .unwrap();
    }
    assert_eq!(arena.list_judges(Some(&root), &sid).unwrap().len(), 2);

    // Episode 1: seed, start, perform.
    arena
        .advance_phase(
            Some(&root),
            &sid,
            AdvanceRequest {
                target: Some("episode1".into()),
            },
        )
        .unwrap();
    let queue = arena
        .seed_queue(
            Some(&root),
            &sid,
            SeedQueueRequest {
                episode: Some(1),
                agent_ids: vec![a.agent.id.to_string(), b.agent.id.to_string()],
            },
        )
        .unwrap();
    assert_eq!(queue.len(), 2);
    let started = arena.start_next(Some(&root), &sid, stage(1, None)).unwrap();
    assert_eq!(started.current.as_ref().unwrap().agent_id, a.agent.id);

    let performance = arena
        .submit_performance(
            Some(&alice),
            PerformanceRequest {
                season_id: sid.clone(),
                title: "Opening night".into(),
                kind: "text".into(),
                content: "Why did the agent cross the road?".into(),
            },
        )
        .unwrap();

    // Bob is not on stage yet.
    let err = arena
        .submit_performance(
            Some(&bob),
            PerformanceRequest {
                season_id: sid.clone(),
                title: "Too early".into(),
                kind: "text".into(),
                content: "...".into(),
            },
        )
        .unwrap_err();
    assert_eq!(err.code(), "NOT_CURRENT_PERFORMER");

    // One score is not a quorum of two.
    let score = |token: &str, value: i64| {
        arena.submit_score(
            Some(token),
            ScoreRequest {
                season_id: sid.clone(),
                performance_id: performance.id.to_string(),
                score: value,
                notes: None,
            },
        )
    };
    score(&judge_tokens[0], 8).unwrap();
    let waiting = arena
        .auto_advance(Some(&root), &sid, stage(1, None))
        .unwrap();
    assert!(matches!(
        waiting,
        AutoAdvance::WaitingForScores {
            scored: 1,
            required: 2,
            ..
        }
    ));

    // The second judge completes the quorum.
    score(&judge_tokens[1], 6).unwrap();
    let view = arena.current_stage(&sid).unwrap().unwrap();
    assert_eq!(view.summary.count, 2);
    assert_eq!(view.summary.average, Some(7.0));

    let advanced = arena
        .auto_advance(Some(&root), &sid, stage(1, None))
        .unwrap();
    let AutoAdvance::Advanced(stage_move) = advanced else {
        panic!("expected an advance, got {advanced:?}");
    };
    assert_eq!(stage_move.retired.unwrap().agent_id, a.agent.id);
    assert_eq!(stage_move.current.unwrap().agent_id, b.agent.id);

    let queue = arena.list_queue(Some(&root), &sid, Some(1)).unwrap();
    assert_eq!(queue[0].status, QueueStatus::Done);
    assert_eq!(queue[1].status, QueueStatus::Performing);

    let metrics = h.node.metrics.encode().unwrap();
    assert!(metrics.contains("agt_scores_submitted_total 2"));
    assert!(metrics.contains("agt_stage_advances_total{trigger=\"quorum\"} 1"));
}

#[test]
fn admin_actions_require_admin_role() {
    let h = harness();
    let agent = login(&h.arena, 30);

    let err = h
        .arena
        .create_season(
            Some(&agent),
            CreateSeasonRequest {
                name: "Nope".into(),
                description: None,
            },
        )
        .unwrap_err();
    assert_eq!(err.code(), "NOT_ADMIN");
    assert_eq!(err.class(), FailureClass::Authorization);

    let err = h
        .arena
        .create_season(
            None,
            CreateSeasonRequest {
                name: "Nope".into(),
                description: None,
            },
        )
        .unwrap_err();
    assert_eq!(err.class(), FailureClass::Authentication);
    assert!(h
        .node
        .metrics
        .encode()
        .unwrap()
        .contains("agt_auth_failures_total 1"));
}

#[test]
fn super_admin_grants_and_revokes_admins() {
    let h = harness();
    let root = login(&h.arena, 1);
    let deputy = login(&h.arena, 2);

    let granted = h
        .arena
        .grant_admin(
            Some(&root),
            GrantAdminRequest {
                address: wallet(2).1,
                role: "admin".into(),
            },
        )
        .unwrap();
    assert!(granted.is_some());
    h.arena
        .create_season(
            Some(&deputy),
            CreateSeasonRequest {
                name: "Deputy season".into(),
                description: Some("made by an admin".into()),
            },
        )
        .unwrap();

    // An admin cannot grant further.
    let err = h
        .arena
        .grant_admin(
            Some(&deputy),
            GrantAdminRequest {
                address: wallet(3).1,
                role: "admin".into(),
            },
        )
        .unwrap_err();
    assert_eq!(err.code(), "NOT_SUPER_ADMIN");

    // Granting participant revokes.
    let revoked = h
        .arena
        .grant_admin(
            Some(&root),
            GrantAdminRequest {
                address: wallet(2).1,
                role: "participant".into(),
            },
        )
        .unwrap();
    assert!(revoked.is_none());
    assert_eq!(h.arena.list_admins(Some(&root)).unwrap().len(), 1);
}

#[test]
fn register_then_me() {
    let h = harness();
    let token = login(&h.arena, 40);

    let me = h.arena.me(Some(&token)).unwrap();
    assert!(me.agent.is_none());

    let first = h
        .arena
        .register_agent(
            Some(&token),
            RegisterRequest {
                name: "Echo".into(),
                description: Some("  ".into()),
                website: None,
            },
        )
        .unwrap();
    assert!(first.created);
    assert_eq!(first.agent.description, None);

    let second = h
        .arena
        .register_agent(
            Some(&token),
            RegisterRequest {
                name: "Echo II".into(),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.agent.id, first.agent.id);

    let me = h.arena.me(Some(&token)).unwrap();
    assert_eq!(me.agent.unwrap().display_name, "Echo II");
}

#[test]
fn agents_read_their_audition_and_volunteer_as_judges() {
    let h = harness();
    let arena = &h.arena;
    let root = login(arena, 1);
    let sid = arena
        .create_season(
            Some(&root),
            CreateSeasonRequest {
                name: "Open mic".into(),
                description: None,
            },
        )
        .unwrap()
        .id
        .to_string();
    arena
        .activate_season(Some(&root), &sid, ActivateRequest::default())
        .unwrap();

    // No agent profile yet.
    let performer = login(arena, 60);
    let err = arena.my_audition(Some(&performer), &sid).unwrap_err();
    assert_eq!(err.code(), "NO_AGENT");

    let receipt = arena
        .submit_audition(Some(&performer), audition(&sid, "mime"))
        .unwrap();
    let mine = arena.my_audition(Some(&performer), &sid).unwrap();
    assert_eq!(mine.id, receipt.audition.id);
    assert_eq!(mine.status, AuditionStatus::Pending);

    let volunteer = login(arena, 61);
    let register = || JudgeRegistrationRequest {
        season_id: sid.clone(),
        specializations: vec![" Comedy ".into()],
        bio: Some("seen a few shows".into()),
    };
    let err = arena.register_judge(Some(&volunteer), register()).unwrap_err();
    assert_eq!(err.code(), "NO_AGENT");
    let err = arena.my_audition(Some(&volunteer), &sid).unwrap_err();
    assert_eq!(err.code(), "NO_AGENT");

    arena
        .register_agent(
            Some(&volunteer),
            RegisterRequest {
                name: "Critic".into(),
                ..Default::default()
            },
        )
        .unwrap();
    let err = arena.my_audition(Some(&volunteer), &sid).unwrap_err();
    assert_eq!(err.code(), "NO_AUDITION");
    assert_eq!(err.class(), FailureClass::NotFound);

    let judge = arena.register_judge(Some(&volunteer), register()).unwrap();
    assert_eq!(judge.specializations, vec!["comedy".to_string()]);
    assert_eq!(judge.bio.as_deref(), Some("seen a few shows"));

    let public = arena.season_judges(&sid).unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].address.as_str(), wallet(61).1);

    // Removal hides the judge publicly; admins still see the row.
    arena
        .remove_judge(
            Some(&root),
            &sid,
            JudgeRequest {
                address: wallet(61).1,
                specializations: Vec::new(),
            },
        )
        .unwrap();
    assert!(arena.season_judges(&sid).unwrap().is_empty());
    let roster = arena.list_judges(Some(&root), &sid).unwrap();
    assert_eq!(roster.len(), 1);
    assert!(!roster[0].active);

    let err = arena.season_judges("00000000-0000-4000-8000-000000000000").unwrap_err();
    assert_eq!(err.code(), "SEASON_NOT_FOUND");
}

#[test]
fn admin_me_reports_the_admin_role() {
    let h = harness();
    let root = login(&h.arena, 1);
    let principal = h.arena.admin_me(Some(&root)).unwrap();
    assert_eq!(principal.role, Role::SuperAdmin);
    assert_eq!(principal.address.as_str(), wallet(1).1);

    let agent = login(&h.arena, 62);
    let err = h.arena.admin_me(Some(&agent)).unwrap_err();
    assert_eq!(err.code(), "NOT_ADMIN");
    let err = h.arena.admin_me(None).unwrap_err();
    assert_eq!(err.class(), FailureClass::Authentication);
}

#[test]
fn auditions_close_with_their_window() {
    let h = harness();
    let root = login(&h.arena, 1);
    let season = h
        .arena
        .create_season(
            Some(&root),
            CreateSeasonRequest {
                name: "Short".into(),
                description: None,
            },
        )
        .unwrap();
    let sid = season.id.to_string();
    h.arena
        .activate_season(
            Some(&root),
            &sid,
            ActivateRequest {
                auditions_days: Some(2),
                ..Default::default()
            },
        )
        .unwrap();

    h.clock.advance(DAY);
    let early = login(&h.arena, 50);
    h.arena
        .submit_audition(Some(&early), audition(&sid, "early"))
        .unwrap();

    h.clock.advance(2 * DAY);
    let late = login(&h.arena, 51);
    let err = h
        .arena
        .submit_audition(Some(&late), audition(&sid, "late"))
        .unwrap_err();
    assert_eq!(err.code(), "AUDITIONS_CLOSED");
    assert_eq!(err.class(), FailureClass::StateConflict);
}

#[test]
fn driver_tick_forces_a_no_show() {
    let h = harness();
    let root = login(&h.arena, 1);
    let season = h
        .arena
        .create_season(
            Some(&root),
            CreateSeasonRequest {
                name: "Ticks".into(),
                description: None,
            },
        )
        .unwrap();
    let sid = season.id.to_string();
    h.arena
        .activate_season(Some(&root), &sid, ActivateRequest::default())
        .unwrap();

    let agent = login(&h.arena, 60);
    let receipt = h
        .arena
        .submit_audition(Some(&agent), audition(&sid, "ghost"))
        .unwrap();
    h.arena
        .seed_queue(
            Some(&root),
            &sid,
            SeedQueueRequest {
                episode: None,
                agent_ids: vec![receipt.agent.id.to_string()],
            },
        )
        .unwrap();

    let first = h.arena.tick(Some(&root), &sid, stage(1, None)).unwrap();
    assert!(matches!(first, TickOutcome::Started(_)));

    let idle = h.arena.tick(Some(&root), &sid, stage(1, None)).unwrap();
    assert!(matches!(idle, TickOutcome::Idle { .. }));

    h.clock.advance(61);
    let forced = h.arena.tick(Some(&root), &sid, stage(1, None)).unwrap();
    let TickOutcome::Forced { stage_move, .. } = forced else {
        panic!("expected a forced move, got {forced:?}");
    };
    assert!(stage_move.done());
}

#[test]
fn malformed_ids_are_rejected_before_lookup() {
    let h = harness();
    let root = login(&h.arena, 1);
    let err = h
        .arena
        .activate_season(Some(&root), "not-a-uuid", ActivateRequest::default())
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_SEASON_ID");

    let err = h.arena.get_season(&uuid_like()).unwrap_err();
    assert_eq!(err.code(), "SEASON_NOT_FOUND");
    assert_eq!(err.class(), FailureClass::NotFound);
}

fn uuid_like() -> String {
    "00000000-0000-4000-8000-000000000000".to_string()
}

#[test]
fn lmdb_node_keeps_state_across_restarts() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = NodeConfig {
        data_dir: dir.path().join("db"),
        lmdb_map_size: 16 * 1024 * 1024,
        super_admins: vec![wallet(1).1],
        session_secret: Some("ef".repeat(32)),
        ..Default::default()
    };

    let season_id = {
        let node = ArenaNode::open(config.clone()).expect("open lmdb node");
        let root = login(&node.arena, 1);
        node.arena
            .create_season(
                Some(&root),
                CreateSeasonRequest {
                    name: "Persistent".into(),
                    description: None,
                },
            )
            .unwrap()
            .id
    };

    let reopened = ArenaNode::open(config).expect("reopen lmdb node");
    let season = reopened.arena.get_season(&season_id.to_string()).unwrap();
    assert_eq!(season.name, "Persistent");
    assert_eq!(season.phase, SeasonPhase::Draft);
    let root = login(&reopened.arena, 1);
    assert_eq!(reopened.arena.list_admins(Some(&root)).unwrap().len(), 1);
}

//! End-to-end stage runs against the in-memory store.

use std::sync::Arc;

use agt_crypto::{derive_address, keypair_from_seed};
use agt_nullables::{NullClock, NullStore};
use agt_season::{AuditionGate, AuditionSubmission, JudgeRoster, SeasonLifecycle};
use agt_stage::{
    AutoAdvance, ForceReason, PerformanceDesk, PerformanceSubmission, ScoreAggregator,
    StageDriver, StageError, StageScheduler, StageViewer, TickOutcome,
};
use agt_store::{AgentRecord, PerformanceRecord};
use agt_types::{
    AgentId, ArenaParams, Episode, QueueStatus, SeasonDurations, SeasonId, SeasonPhase,
    WalletAddress, SECS_PER_DAY,
};

const T0: u64 = 1_700_000_000;

struct Arena {
    clock: Arc<NullClock>,
    lifecycle: SeasonLifecycle,
    gate: AuditionGate,
    roster: JudgeRoster,
    scheduler: Arc<StageScheduler>,
    desk: PerformanceDesk,
    scores: ScoreAggregator,
    driver: StageDriver,
    viewer: StageViewer,
    season: SeasonId,
}

fn wallet(seed: u8) -> WalletAddress {
    derive_address(&keypair_from_seed(&[seed; 32]).public)
}

fn admin() -> WalletAddress {
    wallet(200)
}

fn arena() -> Arena {
    let store = Arc::new(NullStore::new());
    let clock = Arc::new(NullClock::new(T0));
    let params = ArenaParams::default();
    let lifecycle = SeasonLifecycle::new(store.clone(), clock.clone(), params.phase_gap_secs);
    let scheduler = Arc::new(StageScheduler::new(store.clone(), clock.clone()));
    let season = lifecycle.create(&admin(), "Season One", None).unwrap();
    lifecycle
        .activate(&season.id, SeasonDurations::default())
        .unwrap();

    Arena {
        gate: AuditionGate::new(store.clone(), clock.clone()),
        roster: JudgeRoster::new(store.clone(), clock.clone()),
        desk: PerformanceDesk::new(store.clone(), clock.clone()),
        scores: ScoreAggregator::new(store.clone(), clock.clone(), params.clone()),
        driver: StageDriver::new(
            scheduler.clone(),
            clock.clone(),
            params.performance_duration_secs,
            params.no_show_grace_secs,
        ),
        viewer: StageViewer::new(store),
        scheduler,
        lifecycle,
        clock,
        season: season.id,
    }
}

impl Arena {
    fn audition(&self, seed: u8, verdict: Option<&str>) -> AgentRecord {
        let (agent, audition) = self
            .gate
            .submit(
                &self.season,
                &wallet(seed),
                AuditionSubmission {
                    display_name: format!("agent-{seed}"),
                    category: "comedy".into(),
                    title: "Tight five".into(),
                    content: "a robot walks into a bar".into(),
                },
            )
            .unwrap();
        if let Some(status) = verdict {
            self.gate
                .decide(&self.season, &audition.id, status, None, &admin())
                .unwrap();
        }
        agent
    }

    fn judges(&self, seeds: &[u8]) {
        for seed in seeds {
            self.roster
                .add(&self.season, wallet(*seed).as_str(), vec![])
                .unwrap();
        }
    }

    fn perform(&self, seed: u8) -> Result<PerformanceRecord, StageError> {
        self.desk.submit(
            &self.season,
            &wallet(seed),
            PerformanceSubmission {
                title: "Encore".into(),
                kind: "text".into(),
                content: "knock knock".into(),
            },
        )
    }

    fn score(&self, judge: u8, performance: &PerformanceRecord, score: i64) {
        self.scores
            .submit_score(&self.season, &wallet(judge), &performance.id, score, None)
            .unwrap();
    }

    fn to_episode1(&self) {
        self.lifecycle
            .advance(&self.season, Some(SeasonPhase::Episode1))
            .unwrap();
    }
}

#[test]
fn seeding_sets_positions_and_nobody_performs() {
    let a = arena();
    let ids: Vec<AgentId> = (1..=3).map(|s| a.audition(s, Some("accepted")).id).collect();
    let queue = a.scheduler.seed(&a.season, Episode::One, &ids).unwrap();

    assert_eq!(
        queue.iter().map(|e| e.position).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(queue.iter().all(|e| e.status == QueueStatus::Pending));
    assert!(a.scheduler.current(&a.season, Episode::One).unwrap().is_none());
    assert_eq!(
        a.scheduler.auto_advance(&a.season, Episode::One, None).unwrap(),
        AutoAdvance::NoCurrent
    );
}

#[test]
fn seeding_validates_agent_list() {
    let a = arena();
    let agent = a.audition(1, None);
    assert!(matches!(
        a.scheduler.seed(&a.season, Episode::One, &[]),
        Err(StageError::MissingAgentIds)
    ));
    assert!(matches!(
        a.scheduler.seed(&a.season, Episode::One, &[agent.id, agent.id]),
        Err(StageError::DuplicateAgent(_))
    ));
    assert!(matches!(
        a.scheduler
            .seed(&a.season, Episode::One, &[agent.id, AgentId::new_random()]),
        Err(StageError::AgentNotFound(_))
    ));
}

#[test]
fn quorum_of_three_waits_then_advances() {
    let a = arena();
    let first = a.audition(1, Some("accepted"));
    let second = a.audition(2, Some("accepted"));
    a.judges(&[101, 102, 103]);
    a.to_episode1();
    a.scheduler
        .seed(&a.season, Episode::One, &[first.id, second.id])
        .unwrap();
    a.scheduler.start_next(&a.season, Episode::One).unwrap();

    assert!(matches!(
        a.scheduler.auto_advance(&a.season, Episode::One, None).unwrap(),
        AutoAdvance::NoPerformance { .. }
    ));

    let performance = a.perform(1).unwrap();
    a.score(101, &performance, 7);
    a.score(102, &performance, 9);
    // Rescoring does not add a row.
    a.score(101, &performance, 8);
    assert_eq!(a.scores.scores_for(&a.season, &first.id).unwrap().len(), 2);

    match a.scheduler.auto_advance(&a.season, Episode::One, Some(3)).unwrap() {
        AutoAdvance::WaitingForScores {
            judge_count,
            scored,
            required,
            current,
        } => {
            assert_eq!((judge_count, scored, required), (3, 2, 3));
            assert_eq!(current.agent_id, first.id);
        }
        other => panic!("expected to wait, got {other:?}"),
    }
    let still = a.scheduler.current(&a.season, Episode::One).unwrap().unwrap();
    assert_eq!(still.agent_id, first.id);

    a.score(103, &performance, 6);
    match a.scheduler.auto_advance(&a.season, Episode::One, Some(3)).unwrap() {
        AutoAdvance::Advanced(stage_move) => {
            assert_eq!(stage_move.retired.unwrap().agent_id, first.id);
            assert_eq!(stage_move.current.unwrap().agent_id, second.id);
        }
        other => panic!("expected to advance, got {other:?}"),
    }

    let summary = a.scores.summary(&a.season, &first.id).unwrap();
    assert_eq!(summary.count, 3);
    assert_eq!(summary.average, Some((8.0 + 9.0 + 6.0) / 3.0));
}

#[test]
fn stale_advance_fails_and_changes_nothing() {
    let a = arena();
    let first = a.audition(1, Some("accepted"));
    let second = a.audition(2, Some("accepted"));
    a.scheduler
        .seed(&a.season, Episode::One, &[first.id, second.id])
        .unwrap();
    let opened = a.scheduler.start_next(&a.season, Episode::One).unwrap();
    let observed = opened.current.unwrap().id;

    a.scheduler.start_next(&a.season, Episode::One).unwrap();
    assert!(matches!(
        a.scheduler
            .advance_from(&a.season, Episode::One, Some(observed)),
        Err(StageError::StageMoved)
    ));
    let current = a.scheduler.current(&a.season, Episode::One).unwrap().unwrap();
    assert_eq!(current.agent_id, second.id);
}

#[test]
fn last_performer_leaves_an_empty_stage() {
    let a = arena();
    let only = a.audition(1, Some("accepted"));
    a.scheduler.seed(&a.season, Episode::One, &[only.id]).unwrap();
    a.scheduler.start_next(&a.season, Episode::One).unwrap();
    let finished = a.scheduler.start_next(&a.season, Episode::One).unwrap();
    assert!(finished.done());
    assert!(a
        .scheduler
        .queue(&a.season, Episode::One)
        .unwrap()
        .iter()
        .all(|e| e.status == QueueStatus::Done));
}

#[test]
fn pending_audition_cannot_perform_even_on_stage() {
    let a = arena();
    let pending = a.audition(1, None);
    a.to_episode1();
    a.scheduler.seed(&a.season, Episode::One, &[pending.id]).unwrap();
    a.scheduler.start_next(&a.season, Episode::One).unwrap();
    assert!(matches!(a.perform(1), Err(StageError::NotAccepted)));
}

#[test]
fn performance_needs_episode_phase_and_the_stage() {
    let a = arena();
    let first = a.audition(1, Some("accepted"));
    let second = a.audition(2, Some("accepted"));
    a.scheduler
        .seed(&a.season, Episode::One, &[first.id, second.id])
        .unwrap();
    a.scheduler.start_next(&a.season, Episode::One).unwrap();

    assert!(matches!(
        a.perform(1),
        Err(StageError::NotInPerformanceWindow)
    ));
    a.to_episode1();
    assert!(matches!(a.perform(2), Err(StageError::NotCurrentPerformer)));
    assert!(matches!(
        a.perform(9),
        Err(StageError::AgentNotRegistered(_))
    ));
    assert!(a.perform(1).is_ok());
}

#[test]
fn only_active_judges_score_in_range() {
    let a = arena();
    let first = a.audition(1, Some("accepted"));
    a.judges(&[101]);
    a.to_episode1();
    a.scheduler.seed(&a.season, Episode::One, &[first.id]).unwrap();
    a.scheduler.start_next(&a.season, Episode::One).unwrap();
    let performance = a.perform(1).unwrap();

    assert!(matches!(
        a.scores
            .submit_score(&a.season, &wallet(150), &performance.id, 5, None),
        Err(StageError::NotAJudge)
    ));
    assert!(matches!(
        a.scores
            .submit_score(&a.season, &wallet(101), &performance.id, 11, None),
        Err(StageError::InvalidScore(11))
    ));
    assert!(matches!(
        a.scores
            .submit_score(&a.season, &wallet(101), &agt_types::PerformanceId::new_random(), 5, None),
        Err(StageError::PerformanceNotFound(_))
    ));
}

#[test]
fn driver_skips_a_no_show() {
    let a = arena();
    let first = a.audition(1, Some("accepted"));
    let second = a.audition(2, Some("accepted"));
    a.to_episode1();
    a.scheduler
        .seed(&a.season, Episode::One, &[first.id, second.id])
        .unwrap();

    assert!(matches!(
        a.driver.tick(&a.season, Episode::One, None).unwrap(),
        TickOutcome::Started(_)
    ));
    a.clock.advance(30);
    assert!(matches!(
        a.driver.tick(&a.season, Episode::One, None).unwrap(),
        TickOutcome::Idle {
            waiting: AutoAdvance::NoPerformance { .. }
        }
    ));
    a.clock.advance(31);
    match a.driver.tick(&a.season, Episode::One, None).unwrap() {
        TickOutcome::Forced { reason, stage_move } => {
            assert_eq!(reason, ForceReason::NoShow);
            assert_eq!(stage_move.current.unwrap().agent_id, second.id);
        }
        other => panic!("expected a forced advance, got {other:?}"),
    }
}

#[test]
fn driver_forces_after_the_performance_slot() {
    let a = arena();
    let first = a.audition(1, Some("accepted"));
    a.judges(&[101, 102]);
    a.to_episode1();
    a.scheduler.seed(&a.season, Episode::One, &[first.id]).unwrap();
    a.driver.tick(&a.season, Episode::One, None).unwrap();

    let performance = a.perform(1).unwrap();
    a.score(101, &performance, 4);
    a.clock.advance(100);
    assert!(matches!(
        a.driver.tick(&a.season, Episode::One, None).unwrap(),
        TickOutcome::Idle {
            waiting: AutoAdvance::WaitingForScores { .. }
        }
    ));

    a.clock.advance(80);
    match a.driver.tick(&a.season, Episode::One, None).unwrap() {
        TickOutcome::Forced { reason, stage_move } => {
            assert_eq!(reason, ForceReason::TimeUp);
            assert!(stage_move.done());
        }
        other => panic!("expected a forced advance, got {other:?}"),
    }
}

#[test]
fn driver_advances_on_quorum() {
    let a = arena();
    let first = a.audition(1, Some("accepted"));
    a.judges(&[101, 102]);
    a.to_episode1();
    a.scheduler.seed(&a.season, Episode::One, &[first.id]).unwrap();
    a.driver.tick(&a.season, Episode::One, None).unwrap();

    let performance = a.perform(1).unwrap();
    a.score(101, &performance, 4);
    assert!(matches!(
        a.driver.tick(&a.season, Episode::One, Some(1)).unwrap(),
        TickOutcome::Quorum(_)
    ));
}

#[test]
fn empty_roster_only_moves_on_timeout() {
    let a = arena();
    let first = a.audition(1, Some("accepted"));
    a.to_episode1();
    a.scheduler.seed(&a.season, Episode::One, &[first.id]).unwrap();
    a.scheduler.start_next(&a.season, Episode::One).unwrap();
    a.perform(1).unwrap();

    match a.scheduler.auto_advance(&a.season, Episode::One, None).unwrap() {
        AutoAdvance::WaitingForScores {
            judge_count,
            required,
            ..
        } => assert_eq!((judge_count, required), (0, 1)),
        other => panic!("expected to wait, got {other:?}"),
    }
}

#[test]
fn stage_view_shows_the_performer() {
    let a = arena();
    let first = a.audition(1, Some("accepted"));
    a.judges(&[101]);
    a.to_episode1();
    assert!(a.viewer.current_stage(&a.season).unwrap().is_none());

    a.scheduler.seed(&a.season, Episode::One, &[first.id]).unwrap();
    a.scheduler.start_next(&a.season, Episode::One).unwrap();
    let performance = a.perform(1).unwrap();
    a.score(101, &performance, 10);

    let view = a.viewer.current_stage(&a.season).unwrap().unwrap();
    assert_eq!(view.episode, Episode::One);
    assert_eq!(view.agent.id, first.id);
    assert_eq!(view.performance.unwrap().id, performance.id);
    assert_eq!(view.summary.count, 1);
    assert_eq!(view.summary.average, Some(10.0));
}

#[test]
fn auditions_close_with_their_window() {
    let a = arena();
    a.clock.advance(SECS_PER_DAY);
    a.audition(1, None);
    a.clock.advance(2 * SECS_PER_DAY);
    let late = a.gate.submit(
        &a.season,
        &wallet(2),
        AuditionSubmission {
            display_name: "late".into(),
            category: "art".into(),
            title: "t".into(),
            content: "c".into(),
        },
    );
    assert!(matches!(
        late,
        Err(agt_season::SeasonError::AuditionsClosed)
    ));
}

#[test]
fn removed_judges_no_longer_count_toward_quorum() {
    let a = arena();
    let first = a.audition(1, Some("accepted"));
    let second = a.audition(2, Some("accepted"));
    a.judges(&[101, 102, 103]);
    a.to_episode1();
    a.scheduler
        .seed(&a.season, Episode::One, &[first.id, second.id])
        .unwrap();
    a.scheduler.start_next(&a.season, Episode::One).unwrap();
    let performance = a.perform(1).unwrap();
    a.score(101, &performance, 7);
    a.score(102, &performance, 5);

    a.roster.remove(&a.season, wallet(102).as_str()).unwrap();
    match a.scheduler.auto_advance(&a.season, Episode::One, Some(2)).unwrap() {
        AutoAdvance::WaitingForScores {
            judge_count,
            scored,
            required,
            ..
        } => assert_eq!((judge_count, scored, required), (2, 1, 2)),
        other => panic!("expected to wait, got {other:?}"),
    }

    a.score(103, &performance, 9);
    assert!(matches!(
        a.scheduler.auto_advance(&a.season, Episode::One, Some(2)).unwrap(),
        AutoAdvance::Advanced(_)
    ));
}

#[test]
fn stage_view_ignores_scores_from_an_earlier_episode() {
    let a = arena();
    let first = a.audition(1, Some("accepted"));
    a.judges(&[101]);
    a.to_episode1();
    a.scheduler.seed(&a.season, Episode::One, &[first.id]).unwrap();
    a.scheduler.start_next(&a.season, Episode::One).unwrap();
    let opening = a.perform(1).unwrap();
    a.score(101, &opening, 4);
    a.scheduler.start_next(&a.season, Episode::One).unwrap();

    a.lifecycle
        .advance(&a.season, Some(SeasonPhase::Episode2))
        .unwrap();
    a.scheduler.seed(&a.season, Episode::Two, &[first.id]).unwrap();
    a.scheduler.start_next(&a.season, Episode::Two).unwrap();
    let finale = a.perform(1).unwrap();
    assert_ne!(finale.id, opening.id);

    let view = a.viewer.current_stage(&a.season).unwrap().unwrap();
    assert_eq!(view.episode, Episode::Two);
    assert!(view.scores.is_empty());
    assert_eq!(view.summary.count, 0);

    a.score(101, &finale, 9);
    let view = a.viewer.current_stage(&a.season).unwrap().unwrap();
    assert_eq!(view.summary.count, 1);
    assert_eq!(view.summary.average, Some(9.0));
}

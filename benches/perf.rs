use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use h2h_terminal::fpl_fetch::parse_bootstrap_json;
use h2h_terminal::h2h::compute_head_to_head_risk;
use h2h_terminal::models::{PlanEvent, Player, Position};
use h2h_terminal::projection::project_squad;
use h2h_terminal::seed;

const BOOTSTRAP_JSON: &str = r#"{
  "events": [
    { "id": 23, "is_current": false, "finished": true },
    { "id": 24, "is_current": true, "finished": false }
  ],
  "teams": [
    { "id": 1, "short_name": "ARS" },
    { "id": 2, "short_name": "CHE" },
    { "id": 3, "short_name": "LIV" },
    { "id": 4, "short_name": "MCI" }
  ],
  "elements": [
    { "id": 101, "web_name": "Saka", "team": 1, "element_type": 3 },
    { "id": 102, "web_name": "Raya", "team": 1, "element_type": 1 },
    { "id": 103, "web_name": "Palmer", "team": 2, "element_type": 3 },
    { "id": 104, "web_name": "Salah", "team": 3, "element_type": 3 },
    { "id": 105, "web_name": "Haaland", "team": 4, "element_type": 4 },
    { "id": 106, "web_name": "Gvardiol", "team": 4, "element_type": 2 }
  ]
}"#;

fn transfer_churn_events() -> Vec<PlanEvent> {
    let mut events = Vec::new();
    for week in 24..=30 {
        for n in 0..3 {
            events.push(PlanEvent::TransferOut {
                week,
                player_id: format!("p{}", (week + n) % 15 + 1),
            });
            events.push(PlanEvent::TransferIn {
                week,
                player: Player {
                    id: format!("in-{week}-{n}"),
                    name: format!("Incoming {week}-{n}"),
                    team: "NFO".to_string(),
                    position: Position::MID,
                },
            });
        }
    }
    events
}

fn bench_project_squad(c: &mut Criterion) {
    let base = seed::sample_base_squad(24..=30);
    let events = transfer_churn_events();
    c.bench_function("project_squad_heavy_churn", |b| {
        b.iter(|| {
            for week in 24..=30 {
                let squad = project_squad(black_box(&base), black_box(&events), week);
                black_box(squad.players.len());
            }
        })
    });
}

fn bench_h2h_risk(c: &mut Criterion) {
    let base = seed::sample_base_squad(24..=30);
    let mine: Vec<Player> = base.players.clone();
    let theirs = seed::sample_opponent_squad(25).roster();
    c.bench_function("compute_head_to_head_risk", |b| {
        b.iter(|| {
            let result = compute_head_to_head_risk(
                black_box(&mine),
                black_box(&theirs),
                25,
                Some("p8"),
                Some("p13"),
                None,
                None,
            );
            black_box(result.overlap_percentage);
        })
    });
}

fn bench_bootstrap_parse(c: &mut Criterion) {
    c.bench_function("bootstrap_parse", |b| {
        b.iter(|| {
            let pool = parse_bootstrap_json(black_box(BOOTSTRAP_JSON)).unwrap();
            black_box(pool.players.len());
        })
    });
}

criterion_group!(
    benches,
    bench_project_squad,
    bench_h2h_risk,
    bench_bootstrap_parse
);
criterion_main!(benches);

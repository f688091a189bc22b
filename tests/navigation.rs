use gridbot_runtime::agent::{Agent, Navigator};
use gridbot_runtime::memory::{Memory, MissionEvent};
use gridbot_runtime::model::{CellKind, Grid, Move, Position};
use gridbot_runtime::protocol::{NavState, StepOutcome};
use pretty_assertions::assert_eq;

fn p(row: i32, col: i32) -> Position {
    Position::new(row, col)
}

fn grid(layout: &str) -> Grid {
    layout.parse().expect("grid layout")
}

/// Steps until complete, recording the agent's position after every step.
fn run(nav: &mut Navigator, grid: &mut Grid, limit: usize) -> Vec<Position> {
    let mut trail = Vec::new();
    for _ in 0..limit {
        if nav.is_complete() {
            break;
        }
        nav.step(grid);
        trail.push(grid.agent_position().expect("agent"));
    }
    trail
}

#[test]
fn detours_around_obstacles_placed_before_first_step() {
    let mut g = grid(
        "A...T\n\
         .....\n\
         .....\n\
         .....\n\
         .....",
    );
    g.place_obstacle(p(0, 2)).expect("obstacle");
    g.place_obstacle(p(1, 2)).expect("obstacle");

    let mut nav = Navigator::new(vec![p(0, 4)]);
    let trail = run(&mut nav, &mut g, 50);

    assert!(nav.is_complete());
    assert_eq!(nav.completed().iter().copied().collect::<Vec<_>>(), vec![p(0, 4)]);
    assert_eq!(nav.steps(), 8);
    assert_eq!(trail.last(), Some(&p(0, 4)));
    let crossing: Vec<_> = trail.iter().filter(|c| c.col == 2).collect();
    assert!(crossing.iter().all(|c| c.row == 2 || c.row == 3), "{crossing:?}");
}

#[test]
fn obstacle_on_outstanding_path_forces_replan_before_moving() {
    let mut g = grid(
        ".....\n\
         .....\n\
         A...T\n\
         .....\n\
         .....",
    );
    let mut nav = Navigator::new(vec![p(2, 4)]);

    let first = nav.step(&mut g);
    assert_eq!(first.moved, Some(Move::Right));
    assert!(nav.path_cells(&g).contains(&p(2, 2)));

    g.place_obstacle(p(2, 2)).expect("editor places obstacle");
    let second = nav.step(&mut g);

    assert!(second.replanned);
    assert_eq!(second.state, NavState::Replanning);
    assert!(matches!(second.moved, Some(Move::Up) | Some(Move::Down)));
    assert!(!nav.path_cells(&g).contains(&p(2, 2)));
    assert!(matches!(
        nav.log().events().iter().rev().nth(1),
        Some(MissionEvent::Replanned { moves: 5, .. })
    ));

    run(&mut nav, &mut g, 50);
    assert!(nav.is_complete());
    assert_eq!(nav.steps(), 6);
    assert_eq!(g.kind(p(2, 4)), Some(CellKind::Agent));
}

#[test]
fn sealed_task_is_skipped_and_next_task_pursued() {
    let mut g = grid(
        "A...T\n\
         .....\n\
         .....\n\
         .....\n\
         T....",
    );
    let mut nav = Navigator::new(vec![p(0, 4), p(4, 0)]);
    nav.step(&mut g);
    assert_eq!(g.agent_position(), Some(p(0, 1)));

    g.place_obstacle(p(0, 3)).expect("obstacle");
    g.place_obstacle(p(1, 4)).expect("obstacle");
    let outcome = nav.step(&mut g);

    assert_eq!(outcome.skipped, vec![p(0, 4)]);
    assert_eq!(outcome.state, NavState::Blocked);
    assert!(outcome.moved.is_some());
    assert_eq!(nav.target(), Some(p(4, 0)));

    run(&mut nav, &mut g, 50);
    assert!(nav.is_complete());
    assert_eq!(nav.skipped(), &[p(0, 4)]);
    assert_eq!(nav.completed().iter().copied().collect::<Vec<_>>(), vec![p(4, 0)]);
    assert_eq!(g.kind(p(0, 4)), Some(CellKind::Task));
}

#[test]
fn unreachable_only_task_completes_without_moving() {
    let mut g = grid(
        "A.#T\n\
         ..##",
    );
    let mut nav = Navigator::new(vec![p(0, 3)]);
    let outcome = nav.step(&mut g);

    assert_eq!(
        outcome,
        StepOutcome {
            moved: None,
            collected: None,
            replanned: false,
            skipped: vec![p(0, 3)],
            state: NavState::Complete,
        }
    );
    assert_eq!(nav.steps(), 0);
    assert_eq!(g.agent_position(), Some(p(0, 0)));
}

#[test]
fn obstacle_off_the_path_does_not_replan() {
    let mut g = grid(
        "A...T\n\
         .....\n\
         .....",
    );
    let mut nav = Navigator::new(vec![p(0, 4)]);
    nav.step(&mut g);
    g.place_obstacle(p(2, 2)).expect("obstacle");
    let outcome = nav.step(&mut g);
    assert!(!outcome.replanned);
    assert_eq!(outcome.state, NavState::Navigating);
}

#[test]
fn open_grid_mission_walks_manhattan_legs() {
    let mut g = grid(
        "A.....\n\
         ...T..\n\
         ......\n\
         .T...T",
    );
    let order = vec![p(1, 3), p(3, 5), p(3, 1)];
    let expected: u32 = [p(0, 0), p(1, 3), p(3, 5), p(3, 1)]
        .windows(2)
        .map(|w| w[0].manhattan(w[1]))
        .sum();

    let mut nav = Navigator::new(order);
    run(&mut nav, &mut g, 100);

    assert!(nav.is_complete());
    assert_eq!(nav.steps() as u32, expected);
    assert!(g.tasks().is_empty());
}

#[test]
fn identical_runs_produce_identical_moves() {
    let layout = "A.....\n\
                  .##.#.\n\
                  ....#T\n\
                  .#T...";
    let drive = || {
        let mut g = grid(layout);
        let mut nav = Navigator::new(vec![p(3, 2), p(2, 5)]);
        let mut moves = Vec::new();
        for step in 0..60 {
            if step == 3 {
                let _ = g.toggle_obstacle(p(3, 0));
            }
            if nav.is_complete() {
                break;
            }
            moves.push(nav.step(&mut g).moved);
        }
        (moves, nav.steps())
    };
    assert_eq!(drive(), drive());
}

#[test]
fn skipped_task_collected_later_counts_once() {
    let mut g = grid(
        "A.#T#T\n\
         ...#..\n\
         ......",
    );
    let mut nav = Navigator::new(vec![p(0, 3), p(0, 5)]);
    let first = nav.step(&mut g);
    assert_eq!(first.skipped, vec![p(0, 3)]);
    assert_eq!(nav.skipped(), &[p(0, 3)]);

    // Open the row-0 route and cut the detour through row 2.
    g.toggle_obstacle(p(0, 2)).expect("clear");
    g.toggle_obstacle(p(0, 4)).expect("clear");
    g.place_obstacle(p(2, 3)).expect("block");

    run(&mut nav, &mut g, 50);

    assert!(nav.is_complete());
    assert_eq!(
        nav.completed().iter().copied().collect::<Vec<_>>(),
        vec![p(0, 3), p(0, 5)]
    );
    assert!(nav.skipped().is_empty());
    assert!(nav.summary().starts_with("Waypoints: 2/2 | Skipped: 0 |"));
    assert_eq!(
        nav.log().events().last(),
        Some(&MissionEvent::Completed {
            collected: 2,
            skipped: 0
        })
    );
}

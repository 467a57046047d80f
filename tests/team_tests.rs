use pokemon_battle_sim::combatant::Roster;
use pokemon_battle_sim::data::{DataProvider, LocalDataProvider};
use pokemon_battle_sim::team::{decode_team, encode_team, rate_team};
use pokemon_battle_sim::{build_roster, load_teams, run, CliOptions};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::PathBuf;

const DATA: &str = r#"{
    "moves": [
        {"id": 33, "name": "tackle", "accuracy": 100, "power": 40, "pp": 35,
         "type": "normal", "category": "physical"},
        {"id": 52, "name": "ember", "accuracy": 100, "power": 40, "pp": 25,
         "type": "fire", "category": "special"},
        {"id": 55, "name": "water-gun", "accuracy": 100, "power": 40, "pp": 25,
         "type": "water", "category": "special"},
        {"id": 22, "name": "vine-whip", "accuracy": 100, "power": 45, "pp": 25,
         "type": "grass", "category": "physical"},
        {"id": 165, "name": "struggle", "accuracy": null, "power": 50, "pp": 1,
         "type": "normal", "category": "physical"}
    ],
    "species": [
        {"id": 1, "name": "bulbasaur", "types": ["grass", "poison"],
         "stats": [
            {"name": "hp", "base_value": 45}, {"name": "attack", "base_value": 49},
            {"name": "defense", "base_value": 49}, {"name": "special-attack", "base_value": 65},
            {"name": "special-defense", "base_value": 65}, {"name": "speed", "base_value": 45}],
         "moves": [{"name": "tackle", "level_learned_at": 1, "power": 40},
                   {"name": "vine-whip", "level_learned_at": 7, "power": 45, "type": "grass"}]},
        {"id": 4, "name": "charmander", "types": ["fire"],
         "stats": [
            {"name": "hp", "base_value": 39}, {"name": "attack", "base_value": 52},
            {"name": "defense", "base_value": 43}, {"name": "special-attack", "base_value": 60},
            {"name": "special-defense", "base_value": 50}, {"name": "speed", "base_value": 65}],
         "moves": [{"name": "ember", "level_learned_at": 4, "power": 40, "type": "fire"}],
         "tm_moves": [{"name": "tackle"}]},
        {"id": 7, "name": "squirtle", "types": ["water"],
         "stats": [
            {"name": "hp", "base_value": 44}, {"name": "attack", "base_value": 48},
            {"name": "defense", "base_value": 65}, {"name": "special-attack", "base_value": 50},
            {"name": "special-defense", "base_value": 64}, {"name": "speed", "base_value": 43}],
         "moves": [{"name": "tackle", "level_learned_at": 1},
                   {"name": "water-gun", "level_learned_at": 7, "type": "water"}]}
    ]
}"#;

const TEAMS: &str = r#"{
    "team1": [
        {"species": "bulbasaur", "level": 20, "nature": "modest", "moves": ["vine-whip", "tackle"]},
        {"species": "charmander", "level": 20},
        {"species": "squirtle"}
    ],
    "team2": [
        {"species": "squirtle", "level": 20, "moves": ["water-gun"]},
        {"species": "4", "level": 22},
        {"species": "bulbasaur", "level": 18, "ability": "Overgrow"}
    ]
}"#;

fn write_fixture(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "pokemon-battle-sim-{}-{name}",
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn teams_file_builds_rosters() {
    let teams = load_teams(&write_fixture("build-teams.json", TEAMS)).unwrap();
    let provider = LocalDataProvider::from_json(DATA).unwrap();
    let mut rng = SmallRng::seed_from_u64(4);

    let team1 = build_roster(&provider, &teams.team1, &mut rng).await.unwrap();
    assert_eq!(team1.len(), 3);
    let names: Vec<&str> = team1[0].moveset().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["vine-whip", "tackle"]);
    // Charmander has exactly two candidate moves, both end up in its moveset.
    let mut generated: Vec<&str> = team1[1].moveset().iter().map(|m| m.name.as_str()).collect();
    generated.sort_unstable();
    assert_eq!(generated, vec!["ember", "tackle"]);
    assert_eq!(team1[2].level(), 50);

    let team2 = build_roster(&provider, &teams.team2, &mut rng).await.unwrap();
    assert_eq!(team2[1].name(), "charmander");
    assert_eq!(team2[2].ability(), "Overgrow");

    let rating = rate_team(&team1);
    assert_eq!(rating.team_size, 50.0);
    assert!(rating.overall > 0.0 && rating.overall <= 100.0);
}

#[tokio::test]
async fn unknown_species_is_reported() {
    let provider = LocalDataProvider::from_json(DATA).unwrap();
    assert!(provider.fetch_species("pikachu").await.is_err());
    let teams: pokemon_battle_sim::model::TeamsFile = serde_json::from_str(
        r#"{"team1": [{"species": "pikachu"}], "team2": [{"species": "squirtle"}]}"#,
    )
    .unwrap();
    let mut rng = SmallRng::seed_from_u64(0);
    let err = build_roster(&provider, &teams.team1, &mut rng)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("pikachu"));
}

#[tokio::test]
async fn share_codes_round_trip_built_teams() {
    let teams = load_teams(&write_fixture("share-teams.json", TEAMS)).unwrap();
    let provider = LocalDataProvider::from_json(DATA).unwrap();
    let mut rng = SmallRng::seed_from_u64(8);
    let team = build_roster(&provider, &teams.team2, &mut rng).await.unwrap();
    let roster = Roster::from_members(team).unwrap();
    let code = encode_team(&roster).unwrap();
    assert_eq!(decode_team(&code).unwrap(), roster);
}

#[tokio::test]
async fn cli_runs_a_battle_and_a_matrix() {
    let teams_path = write_fixture("run-teams.json", TEAMS);
    let data_path = write_fixture("run-data.json", DATA);
    let output_path = std::env::temp_dir().join(format!(
        "pokemon-battle-sim-{}-matrix.csv",
        std::process::id()
    ));
    let opts = CliOptions {
        teams_path,
        data_path: Some(data_path),
        use_pokeapi: false,
        seed: 42,
        max_turns: 300,
        json: false,
        matrix: false,
        sims_per_cell: 4,
        output_path: Some(output_path.clone()),
    };
    run(opts.clone()).await.unwrap();

    run(CliOptions {
        matrix: true,
        ..opts
    })
    .await
    .unwrap();
    let csv = std::fs::read_to_string(&output_path).unwrap();
    let rate: f64 = csv.trim().parse().unwrap();
    assert!((0.0..=1.0).contains(&rate));
}

#[tokio::test]
async fn cli_requires_a_data_source() {
    let opts = CliOptions {
        teams_path: write_fixture("nodata-teams.json", TEAMS),
        data_path: None,
        use_pokeapi: false,
        seed: 0,
        max_turns: 10,
        json: true,
        matrix: false,
        sims_per_cell: 1,
        output_path: None,
    };
    let err = run(opts).await.unwrap_err();
    assert!(err.to_string().contains("--data"));
}

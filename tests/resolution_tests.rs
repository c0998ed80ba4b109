use evostat::record::{
    AmalgamationRecord, AwakeningRecord, CardRecord, CatalogRecords, RarityRecord,
};
use evostat::*;
use std::sync::Arc;
use std::thread;

fn id(n: u32) -> CardId {
    CardId::new(n)
}

fn uniform(value: i64) -> StatTriple {
    StatTriple::new(value, value, value)
}

fn open_rarity() -> RarityRecord {
    RarityRecord::new(1, "sr", 99999, 99999, 99999)
}

/// A sequential line starting at `first_id`, one card per entry of
/// `max_attack`, ranked from 0. Base stats are half the max stats.
fn line(first_id: u32, character: i64, rarity: u32, max_attack: &[i64]) -> Vec<CardRecord> {
    let last = max_attack.len() as i32 - 1;
    max_attack
        .iter()
        .enumerate()
        .map(|(rank, &attack)| {
            let card_id = first_id + rank as u32;
            let card = CardRecord::new(card_id, character, rarity)
                .ranks(rank as i32, last)
                .base_stats(attack / 2, attack / 2, attack / 2)
                .max_stats(attack, attack, attack);
            if (rank as i32) < last {
                card.evolves_to(card_id + 1)
            } else {
                card
            }
        })
        .collect()
}

fn catalog(cards: Vec<CardRecord>) -> Catalog {
    Catalog::load(CatalogRecords {
        cards,
        rarities: vec![open_rarity()],
        ..Default::default()
    })
    .unwrap()
}

/// Four-star line 10..=14 with max attack 100, 200, 300, 400, 500.
fn four_star() -> Catalog {
    catalog(line(10, 1, 1, &[100, 200, 300, 400, 500]))
}

fn attack(catalog: &Catalog, card: u32, strategy: Strategy) -> i64 {
    catalog.resolve(id(card), strategy, Level::Max).unwrap().attack
}

#[test]
fn test_sequential_evolution_scenario() {
    let catalog = catalog(line(1, 7, 1, &[300, 500, 800]));

    // 1.05 * 500 + 0.15 * 300 + 0.15 * 300
    assert_eq!(attack(&catalog, 2, Strategy::Standard), 615);
}

#[test]
fn test_amalgamation_scenario() {
    let records = |limit: i64| CatalogRecords {
        cards: vec![
            CardRecord::new(1, 1, 1).max_stats(400, 400, 400),
            CardRecord::new(2, 2, 1).max_stats(420, 420, 420),
            CardRecord::new(3, 3, 1).max_stats(450, 450, 450),
            CardRecord::new(4, 4, 1).max_stats(1000, 1000, 1000),
        ],
        amalgamations: vec![AmalgamationRecord::new(1, &[1, 2, 3], 4)],
        rarities: vec![RarityRecord::new(1, "ur", limit, limit, limit)],
        ..Default::default()
    };

    let catalog = Catalog::load(records(9999)).unwrap();
    // 1000 + 32 + 33 + 36
    assert_eq!(
        catalog.resolve(id(4), Strategy::Perfect, Level::Max).unwrap(),
        uniform(1101)
    );

    let capped = Catalog::load(records(1050)).unwrap();
    assert_eq!(
        capped.resolve(id(4), Strategy::Perfect, Level::Max).unwrap(),
        uniform(1050)
    );
}

#[test]
fn test_amalgamation_at_base_level_uses_base_materials() {
    let catalog = Catalog::load(CatalogRecords {
        cards: vec![
            CardRecord::new(1, 1, 1).base_stats(200, 200, 200).max_stats(400, 400, 400),
            CardRecord::new(2, 2, 1).base_stats(250, 250, 250).max_stats(500, 500, 500),
            CardRecord::new(3, 3, 1).base_stats(300, 300, 300).max_stats(900, 900, 900),
        ],
        amalgamations: vec![AmalgamationRecord::new(1, &[1, 2], 3)],
        rarities: vec![open_rarity()],
        ..Default::default()
    })
    .unwrap();

    // 300 + trunc(0.08 * 200) + trunc(0.08 * 250)
    assert_eq!(
        catalog.resolve(id(3), Strategy::Standard, Level::Base).unwrap(),
        uniform(336)
    );
}

#[test]
fn test_multiplications_truncate_immediately() {
    let catalog = catalog(line(1, 7, 1, &[333, 500, 800]));

    // trunc(0.15 * 333) = 49, twice; a single rounding at the end would give 624
    assert_eq!(attack(&catalog, 2, Strategy::Standard), 623);
}

#[test]
fn test_root_stability() {
    let catalog = four_star();
    let root = catalog.card(id(10)).unwrap().clone();

    for strategy in Strategy::ALL {
        for level in Level::ALL {
            assert_eq!(
                catalog.resolve(id(10), strategy, level).unwrap(),
                root.stats_at(level),
                "{strategy} at {level}"
            );
        }
    }
}

#[test]
fn test_four_star_strategies() {
    let catalog = four_star();

    let standard: Vec<i64> = (10..=14).map(|c| attack(&catalog, c, Strategy::Standard)).collect();
    let perfect: Vec<i64> = (10..=14).map(|c| attack(&catalog, c, Strategy::Perfect)).collect();
    let six: Vec<i64> = (10..=14).map(|c| attack(&catalog, c, Strategy::SixCard)).collect();
    let nine: Vec<i64> = (10..=14).map(|c| attack(&catalog, c, Strategy::NineCard)).collect();

    assert_eq!(standard, vec![100, 240, 366, 489, 638]);
    assert_eq!(perfect, vec![100, 240, 387, 536, 710]);
    // rank 4 is fed its stage-1 card instead of a fresh first stage
    assert_eq!(six, vec![100, 240, 366, 489, 659]);
    // ranks 1-2 perfect, rank 3 from standard stages 2 and 1, rank 4 from stages 2 and 3
    assert_eq!(nine, vec![100, 240, 387, 510, 684]);
}

#[test]
fn test_legacy_character_multiplier() {
    let legacy = catalog(line(1, 250, 1, &[100, 500]));
    let regular = catalog(line(1, 251, 1, &[100, 500]));

    // rank 1 of a one-rank line is not boosted, legacy or not
    assert_eq!(attack(&legacy, 2, Strategy::Standard), 530);
    assert_eq!(attack(&regular, 2, Strategy::Standard), 530);

    let legacy = catalog(line(1, 250, 1, &[100, 100, 500]));
    // rank 1: trunc(1.155 * 100) + 15 + 15
    assert_eq!(attack(&legacy, 2, Strategy::Perfect), 145);
    // rank 2: trunc(1.209 * 500) + 2 * trunc(0.15 * 145)
    assert_eq!(attack(&legacy, 3, Strategy::Perfect), 646);
}

#[test]
fn test_cap_applies_to_every_step() {
    let mut cards = line(1, 7, 1, &[300, 500, 800]);
    cards[2].rarity_id = 2;
    let catalog = Catalog::load(CatalogRecords {
        cards,
        rarities: vec![
            RarityRecord::new(1, "sr", 600, 600, 600),
            RarityRecord::new(2, "hsr", 9999, 9999, 9999),
        ],
        ..Default::default()
    })
    .unwrap();

    // rank 1 computes 615 and is clamped to 600 before feeding rank 2
    assert_eq!(attack(&catalog, 2, Strategy::Standard), 600);
    // 1.1 * 800 + trunc(0.15 * 600) + trunc(0.15 * 300)
    assert_eq!(attack(&catalog, 3, Strategy::Standard), 1015);
}

#[test]
fn test_cyclic_awakening_is_reported() {
    let catalog = Catalog::load(CatalogRecords {
        cards: vec![
            CardRecord::new(1, 1, 1).max_stats(100, 100, 100),
            CardRecord::new(2, 1, 1).max_stats(200, 200, 200),
        ],
        awakenings: vec![AwakeningRecord::new(1, 2, 1), AwakeningRecord::new(2, 1, 2)],
        rarities: vec![open_rarity()],
        ..Default::default()
    })
    .unwrap();

    assert!(catalog.lineage_cycle().is_some());
    let err = catalog.resolve(id(1), Strategy::Standard, Level::Max).unwrap_err();
    assert_eq!(
        err,
        LineageError::CyclicLineage {
            path: vec![id(1), id(2), id(1)],
        }
    );
    assert_eq!(err.to_string(), "Cyclic lineage: 1 -> 2 -> 1");
}

#[test]
fn test_turnover_accident() {
    let catalog = catalog(vec![
        CardRecord::new(1, 1, 1)
            .base_stats(100, 100, 100)
            .max_stats(400, 400, 400)
            .turnover_to(2),
        CardRecord::new(2, 2, 1).base_stats(100, 100, 100).max_stats(300, 300, 300),
    ]);

    assert_eq!(
        catalog.predecessor_of(id(2)).unwrap(),
        &PredecessorEdge::TurnoverAccident { source: id(1) }
    );
    // 2 * trunc(0.15 * 400) + own, the source always at standard max
    assert_eq!(
        catalog.resolve(id(2), Strategy::Standard, Level::Max).unwrap(),
        uniform(420)
    );
    assert_eq!(
        catalog.resolve(id(2), Strategy::Perfect, Level::Base).unwrap(),
        uniform(220)
    );
    assert_eq!(
        catalog.successors_of(id(1)),
        vec![SuccessorEdge {
            kind: EdgeKind::TurnoverAccident,
            card: id(2),
        }]
    );
}

#[test]
fn test_awakening_and_rebirth_carry_gains() {
    let catalog = Catalog::load(CatalogRecords {
        cards: vec![
            CardRecord::new(1, 1, 1).base_stats(100, 100, 100).max_stats(300, 300, 300),
            CardRecord::new(2, 1, 1).base_stats(200, 200, 200).max_stats(600, 600, 600),
            CardRecord::new(3, 1, 1).base_stats(300, 300, 300).max_stats(900, 900, 900),
        ],
        awakenings: vec![AwakeningRecord::new(1, 1, 2)],
        rebirths: vec![AwakeningRecord::new(1, 2, 3)],
        rarities: vec![open_rarity()],
        ..Default::default()
    })
    .unwrap();

    // 600 + (300 - 100)
    assert_eq!(
        catalog.resolve(id(2), Strategy::Standard, Level::Max).unwrap(),
        uniform(800)
    );
    assert_eq!(
        catalog.resolve(id(2), Strategy::Standard, Level::Base).unwrap(),
        uniform(200)
    );
    // 900 + (800 - 200)
    assert_eq!(
        catalog.resolve(id(3), Strategy::Standard, Level::Max).unwrap(),
        uniform(1500)
    );
    assert_eq!(
        catalog.predecessor_of(id(3)).unwrap(),
        &PredecessorEdge::Rebirth { source: id(2) }
    );
    assert_eq!(catalog.ancestry(id(3)), vec![id(1), id(2)]);
}

#[test]
fn test_awakening_of_evolved_card_keeps_strategy() {
    let mut cards = line(10, 1, 1, &[100, 200, 300, 400, 500]);
    cards.push(CardRecord::new(20, 1, 1).ranks(-1, 0).base_stats(600, 600, 600).max_stats(900, 900, 900));
    let catalog = Catalog::load(CatalogRecords {
        cards,
        awakenings: vec![AwakeningRecord::new(1, 14, 20)],
        rarities: vec![open_rarity()],
        ..Default::default()
    })
    .unwrap();

    // own + (resolved source - stored source base of 250)
    assert_eq!(attack(&catalog, 20, Strategy::Standard), 900 + 638 - 250);
    assert_eq!(attack(&catalog, 20, Strategy::Perfect), 900 + 710 - 250);
}

#[test]
fn test_mixed_evolution() {
    let catalog = Catalog::load(CatalogRecords {
        cards: vec![
            CardRecord::new(1, 1, 1).max_stats(500, 500, 500),
            CardRecord::new(2, 2, 1).max_stats(500, 500, 500),
            CardRecord::new(3, 3, 1).ranks(0, 1).max_stats(300, 300, 300).evolves_to(4),
            CardRecord::new(4, 3, 1).ranks(1, 1).max_stats(600, 600, 600),
        ],
        amalgamations: vec![AmalgamationRecord::new(1, &[1, 2], 3)],
        rarities: vec![open_rarity()],
        ..Default::default()
    })
    .unwrap();

    // the amalgamated copy: 300 + 40 + 40
    assert_eq!(attack(&catalog, 3, Strategy::Mixed), 380);
    // 600 + trunc(0.15 * 380) + trunc(0.15 * 300), the second copy dropped as-is
    assert_eq!(attack(&catalog, 4, Strategy::Mixed), 702);
    // both copies amalgamated
    assert_eq!(attack(&catalog, 4, Strategy::Standard), 714);
    assert!(catalog.possible_mixed_evo(id(4)));
    assert_eq!(
        catalog.applicable_strategies(id(4)).unwrap(),
        vec![Strategy::Standard, Strategy::Mixed, Strategy::Perfect]
    );
}

#[test]
fn test_strategy_unsupported_by_short_line() {
    let catalog = catalog(line(1, 7, 1, &[100, 200]));

    for strategy in [Strategy::SixCard, Strategy::NineCard] {
        let err = catalog.resolve(id(2), strategy, Level::Max).unwrap_err();
        assert!(
            matches!(err, LineageError::UnresolvedStrategy { card, strategy: s, .. } if card == id(2) && s == strategy),
            "{err}"
        );
    }
    // roots have nothing to evolve
    assert!(catalog.resolve(id(1), Strategy::NineCard, Level::Max).is_ok());
}

#[test]
fn test_six_card_line_on_amalgamated_first_stage() {
    // one-star lines 1 -> 2 and 3 -> 4 fused into card 10, first of 10..=14
    let mut cards = line(1, 1, 1, &[100, 200]);
    cards.extend(line(3, 2, 1, &[100, 200]));
    cards.extend(line(10, 3, 1, &[100, 200, 300, 400, 500]));
    let catalog = Catalog::load(CatalogRecords {
        cards,
        amalgamations: vec![AmalgamationRecord::new(1, &[2, 4], 10)],
        rarities: vec![open_rarity()],
        ..Default::default()
    })
    .unwrap();

    // one-star materials are fed as standard evolutions: 100 + 2 * trunc(0.08 * 230)
    assert_eq!(attack(&catalog, 10, Strategy::SixCard), 136);
    let six: Vec<i64> = (11..=14).map(|c| attack(&catalog, c, Strategy::SixCard)).collect();
    assert_eq!(six, vec![250, 372, 495, 661]);
    assert!(catalog
        .applicable_strategies(id(14))
        .unwrap()
        .contains(&Strategy::SixCard));
    assert!(catalog.resolve(id(14), Strategy::NineCard, Level::Max).is_ok());

    let engine = StatEngine::new(catalog);
    let sheet = engine.stat_sheet(id(14)).unwrap();
    let row = sheet.row(Strategy::SixCard).unwrap();
    assert_eq!(row.max.map(|s| s.attack), Some(661));
    assert!(row.base.is_some());

    // the requested one-star card still reports the strategy unresolved
    let err = engine.resolve(id(2), Strategy::SixCard, Level::Max).unwrap_err();
    assert!(matches!(err, LineageError::UnresolvedStrategy { card, .. } if card == id(2)));
}

#[test]
fn test_missing_stage_is_unresolved() {
    // ranks 0, 2, 3, 4: no rank-1 stage
    let mut cards = line(10, 1, 1, &[100, 200, 300, 400, 500]);
    cards.remove(1);
    cards[0].evolution_card_id = 12;
    let catalog = catalog(cards);

    let err = catalog.resolve(id(14), Strategy::SixCard, Level::Max).unwrap_err();
    assert_eq!(
        err,
        LineageError::UnresolvedStrategy {
            card: id(14),
            strategy: Strategy::SixCard,
            reason: "line has no rank 1 stage".into(),
        }
    );
    // rank 3 fails inside the walk and is reported against the requested card
    assert_eq!(
        catalog.resolve(id(14), Strategy::NineCard, Level::Max),
        Err(LineageError::UnresolvedStrategy {
            card: id(14),
            strategy: Strategy::NineCard,
            reason: "stage 13: line has no rank 1 stage".into(),
        })
    );
    assert!(catalog.resolve(id(14), Strategy::Standard, Level::Max).is_ok());
}

#[test]
fn test_dangling_request() {
    let catalog = four_star();
    assert_eq!(
        catalog.resolve(id(404), Strategy::Standard, Level::Max),
        Err(LineageError::DanglingReference(id(404)))
    );
}

#[test]
fn test_ambiguous_lineage_strict_and_lenient() {
    let records = || CatalogRecords {
        cards: vec![
            CardRecord::new(1, 1, 1).ranks(0, 1).max_stats(100, 100, 100).evolves_to(2),
            CardRecord::new(2, 1, 1).ranks(1, 1).max_stats(300, 300, 300),
            CardRecord::new(3, 2, 1).max_stats(100, 100, 100),
        ],
        amalgamations: vec![AmalgamationRecord::new(1, &[1, 3], 2)],
        rarities: vec![open_rarity()],
        ..Default::default()
    };

    let err = Catalog::load(records()).unwrap_err();
    assert!(matches!(err, CatalogError::AmbiguousLineage { card, .. } if card == id(2)));

    let lenient = EvolutionConstants {
        strict_lineage: false,
        ..EvolutionConstants::default()
    };
    let catalog = Catalog::load_with(records(), lenient).unwrap();
    assert_eq!(
        catalog.predecessor_of(id(2)).unwrap().kind(),
        Some(EdgeKind::Amalgamation)
    );
    // 300 + 8 + 8
    assert_eq!(attack(&catalog, 2, Strategy::Standard), 316);
}

#[test]
fn test_load_from_master_document() {
    let json = r#"{
        "cards": [
            {"_id": 1, "card_chara_id": 5, "card_rare_id": 1, "evolution_rank": 0,
             "last_evolution_rank": 2, "evolution_card_id": 2,
             "default_offense": 150, "default_defense": 150, "default_follower": 150,
             "max_offense": 300, "max_defense": 300, "max_follower": 300},
            {"_id": 2, "card_chara_id": 5, "card_rare_id": 1, "evolution_rank": 1,
             "last_evolution_rank": 2, "evolution_card_id": -1,
             "max_offense": 500, "max_defense": 500, "max_follower": 500}
        ],
        "fusion_list": [],
        "card_awaken": [],
        "card_super_awaken": [],
        "card_rares": [{"_id": 1, "signature": "sr", "max_card_level": 70,
                        "limt_offense": 9999, "limt_defense": 9999, "limt_max_follower": 9999}]
    }"#;
    let catalog = Catalog::load(CatalogRecords::from_json_str(json).unwrap()).unwrap();

    assert_eq!(
        catalog.resolve(id(2), Strategy::Standard, Level::Max).unwrap(),
        uniform(615)
    );
    assert_eq!(catalog.rarity(1).unwrap().code, Some(RarityCode::SR));
}

#[test]
fn test_load_rejects_dangling_amalgamation_material() {
    let err = Catalog::load(CatalogRecords {
        cards: vec![CardRecord::new(1, 1, 1), CardRecord::new(3, 3, 1)],
        amalgamations: vec![AmalgamationRecord::new(7, &[1, 2], 3)],
        rarities: vec![open_rarity()],
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(
        err,
        CatalogError::DanglingReference {
            relation: "amalgamation material",
            owner: 7,
            target: id(2),
        }
    );
}

#[test]
fn test_load_rejects_duplicate_amalgamation_result() {
    let err = Catalog::load(CatalogRecords {
        cards: vec![
            CardRecord::new(1, 1, 1),
            CardRecord::new(2, 2, 1),
            CardRecord::new(3, 3, 1),
        ],
        amalgamations: vec![
            AmalgamationRecord::new(1, &[1, 2], 3),
            AmalgamationRecord::new(2, &[2, 1], 3),
        ],
        rarities: vec![open_rarity()],
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(
        err,
        CatalogError::DuplicateEdge {
            kind: EdgeKind::Amalgamation,
            card: id(3),
        }
    );
}

#[test]
fn test_load_rejects_falling_rarity_ceilings() {
    let err = Catalog::load(CatalogRecords {
        rarities: vec![
            RarityRecord::new(3, "sr", 5000, 5000, 5000),
            RarityRecord::new(6, "hsr", 6000, 4000, 6000),
        ],
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, CatalogError::RarityOrdering { .. }));
}

#[test]
fn test_load_rejects_duplicate_rarity() {
    let err = Catalog::load(CatalogRecords {
        rarities: vec![open_rarity(), open_rarity()],
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(err, CatalogError::DuplicateRarity(1));
}

#[test]
fn test_idempotence_across_cache_clears() {
    let catalog = four_star();
    let first = catalog.resolve(id(14), Strategy::NineCard, Level::Max).unwrap();
    assert!(!catalog.cache().is_empty());

    let cached = catalog.resolve(id(14), Strategy::NineCard, Level::Max).unwrap();
    catalog.clear_cache();
    assert!(catalog.cache().is_empty());
    let recomputed = catalog.resolve(id(14), Strategy::NineCard, Level::Max).unwrap();

    assert_eq!(first, cached);
    assert_eq!(first, recomputed);
}

#[test]
fn test_concurrent_resolution_agrees() {
    let catalog = Arc::new(four_star());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                Strategy::ALL
                    .iter()
                    .map(|&strategy| catalog.resolve(id(14), strategy, Level::Max).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_stat_sheet_degrades_unresolvable_rows() {
    let mut cards = line(10, 1, 1, &[100, 200, 300, 400, 500]);
    cards.remove(1);
    cards[0].evolution_card_id = 12;
    let engine = StatEngine::new(catalog(cards));

    let sheet = engine.stat_sheet(id(14)).unwrap();
    let six = sheet.row(Strategy::SixCard).unwrap();
    assert_eq!(six.max, None);
    assert_eq!(six.base, None);
    assert!(sheet.row(Strategy::Standard).unwrap().max.is_some());
    assert!(sheet.row(Strategy::NineCard).is_some());
    assert_eq!(
        engine.resolve_or_placeholder(id(14), Strategy::SixCard, Level::Max),
        None
    );
}

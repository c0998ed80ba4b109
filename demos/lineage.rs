//! Lineage example: a four-star line, an amalgamation and an awakening
//!
//! This example demonstrates:
//! - Loading a catalog from master data records
//! - Resolving one card under every strategy
//! - Stat sheets with degraded rows
//! - Reloading the engine with new records

use evostat::record::{
    AmalgamationRecord, AwakeningRecord, CardRecord, CatalogRecords, RarityRecord,
};
use evostat::*;

fn records(final_attack: i64) -> CatalogRecords {
    let stage = |id: u32, rank: i32, attack: i64| {
        CardRecord::new(id, 101, 3)
            .named(format!("Frost Witch +{rank}"))
            .ranks(rank, 4)
            .base_stats(attack / 3, attack / 3, attack / 2)
            .max_stats(attack, attack, attack)
    };

    CatalogRecords {
        cards: vec![
            stage(1, 0, 1200).evolves_to(2),
            stage(2, 1, 1500).evolves_to(3),
            stage(3, 2, 1900).evolves_to(4),
            stage(4, 3, 2400).evolves_to(5),
            stage(5, 4, final_attack),
            CardRecord::new(10, 201, 3)
                .named("Iron Golem")
                .base_stats(900, 900, 900)
                .max_stats(2000, 2000, 2000),
            CardRecord::new(11, 202, 3)
                .named("Twin Blades")
                .base_stats(1100, 1100, 1100)
                .max_stats(2600, 2600, 2600),
            CardRecord::new(12, 203, 4)
                .named("Forge Queen")
                .base_stats(1500, 1500, 1500)
                .max_stats(4000, 4000, 4000),
            CardRecord::new(20, 101, 5)
                .named("Frost Witch (awoken)")
                .ranks(-1, 0)
                .base_stats(1800, 1800, 1800)
                .max_stats(4200, 4200, 4200),
        ],
        amalgamations: vec![AmalgamationRecord::new(1, &[10, 11], 12)],
        awakenings: vec![AwakeningRecord::new(1, 5, 20)],
        rarities: vec![
            RarityRecord::new(3, "sr", 6000, 6000, 6000),
            RarityRecord::new(4, "hsr", 7000, 7000, 7000),
            RarityRecord::new(5, "gsr", 9000, 9000, 9000),
        ],
        ..Default::default()
    }
}

fn print_sheet(engine: &StatEngine, card: CardId) -> Result<(), LineageError> {
    let sheet = engine.stat_sheet(card)?;
    let show = |stats: Option<StatTriple>| stats.map_or("-".to_string(), |s| s.to_string());
    for row in &sheet.rows {
        println!(
            "  {:<20} base [{}]  max [{}]",
            row.strategy.to_string(),
            show(row.base),
            show(row.max)
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Card Lineage Demo ===\n");

    let engine = StatEngine::load(records(3000), EvolutionConstants::default())?;
    let catalog = engine.catalog();
    println!("Loaded generation {} with {} cards\n", catalog.generation(), catalog.len());

    // ===== Evolution line =====
    println!("1. Four-star line\n");
    for card in 1..=5 {
        let id = CardId::new(card);
        let standard = catalog.resolve(id, Strategy::Standard, Level::Max)?;
        let perfect = catalog.resolve(id, Strategy::Perfect, Level::Max)?;
        println!("  card {id}: standard [{standard}]  perfect [{perfect}]");
    }
    println!();

    // ===== Stat sheets =====
    println!("2. Stat sheet of the final stage\n");
    print_sheet(&engine, CardId::new(5))?;
    println!();

    println!("3. Amalgamation result\n");
    print_sheet(&engine, CardId::new(12))?;
    println!("  made from: {:?}\n", catalog.ancestry(CardId::new(12)));

    println!("4. Awakening of the final stage\n");
    print_sheet(&engine, CardId::new(20))?;
    println!();

    // ===== Reload =====
    println!("5. Reload with a stronger final stage\n");
    let generation = engine.reload(records(3300))?;
    let before = catalog.resolve(CardId::new(5), Strategy::Standard, Level::Max)?;
    let after = engine.resolve(CardId::new(5), Strategy::Standard, Level::Max)?;
    println!("  generation {}: [{}]", catalog.generation(), before);
    println!("  generation {}: [{}]", generation, after);
    println!("  ✓ The old snapshot keeps answering from its own tables\n");

    // ===== Degradation =====
    println!("6. Unknown card\n");
    match engine.resolve_or_placeholder(CardId::new(999), Strategy::Standard, Level::Max) {
        Some(stats) => println!("  unexpected stats: {stats}"),
        None => println!("  ✓ Placeholder instead of an error"),
    }

    Ok(())
}

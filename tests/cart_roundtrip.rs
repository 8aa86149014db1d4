//! Cart persistence round-trips through the file-backed session store.

use std::collections::BTreeMap;

use testresult::TestResult;

use storefront::prelude::*;

fn snapshot(name: &str, unit_price: u64) -> ProductSnapshot {
    ProductSnapshot {
        name: name.to_owned(),
        unit_price,
        image: None,
    }
}

/// Lines keyed by product id, for order-insensitive comparison.
fn by_id(lines: &[CartLine]) -> BTreeMap<String, (u64, u32)> {
    lines
        .iter()
        .map(|line| (line.product_id.clone(), (line.unit_price, line.quantity)))
        .collect()
}

#[test]
fn rehydrated_cart_matches_regardless_of_insertion_order() -> TestResult {
    let dir_ab = tempfile::tempdir()?;
    let dir_ba = tempfile::tempdir()?;

    let mut first = CartManager::load(JsonFileStore::new(dir_ab.path())?)?;
    first.add_item("A", snapshot("Router", 100))?;
    first.add_item("B", snapshot("Modem", 250))?;
    first.add_item("B", snapshot("Modem", 250))?;

    let mut second = CartManager::load(JsonFileStore::new(dir_ba.path())?)?;
    second.add_item("B", snapshot("Modem", 250))?;
    second.add_item("B", snapshot("Modem", 250))?;
    second.add_item("A", snapshot("Router", 100))?;

    let first = CartManager::load(JsonFileStore::new(dir_ab.path())?)?;
    let second = CartManager::load(JsonFileStore::new(dir_ba.path())?)?;

    assert_eq!(by_id(first.lines()), by_id(second.lines()));
    assert_eq!(first.total(), second.total());

    Ok(())
}

#[test]
fn rehydration_reproduces_lines_exactly() -> TestResult {
    let dir = tempfile::tempdir()?;

    let mut manager = CartManager::load(JsonFileStore::new(dir.path())?)?;
    manager.add_item(
        "A",
        ProductSnapshot {
            name: "Router".to_owned(),
            unit_price: 100,
            image: Some("/static/store/A.jpg".to_owned()),
        },
    )?;
    manager.add_item("B", snapshot("Modem", 250))?;
    manager.change_quantity("A", 4)?;

    let reloaded = CartManager::load(JsonFileStore::new(dir.path())?)?;

    assert_eq!(reloaded.lines(), manager.lines());
    assert_eq!(reloaded.total(), 750);
    assert_eq!(reloaded.line_count(), 6);

    Ok(())
}

#[test]
fn absent_cart_key_is_an_empty_cart() -> TestResult {
    let dir = tempfile::tempdir()?;

    let manager = CartManager::load(JsonFileStore::new(dir.path())?)?;

    assert!(manager.cart().is_empty());
    assert_eq!(manager.total(), 0);
    assert_eq!(manager.line_count(), 0);

    Ok(())
}

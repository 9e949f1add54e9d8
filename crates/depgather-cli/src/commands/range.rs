//! Handler for `depgather range`.

use miette::Result;

use depgather_versioning::{Version, VersionRange};

use crate::cli::RangeAction;

pub fn exec(action: RangeAction) -> Result<()> {
    match action {
        RangeAction::Parse { range } => parse(&range),
        RangeAction::Satisfies { range, versions } => satisfies(&range, &versions),
        RangeAction::Best { range, versions } => best(&range, &versions),
        RangeAction::Subset { subset, superset } => {
            let subset = VersionRange::parse(&subset)?;
            let superset = VersionRange::parse(&superset)?;
            println!("{}", subset.is_subset_or_equal_to(&superset));
            Ok(())
        }
        RangeAction::Combine { ranges } => {
            let parsed = ranges
                .iter()
                .map(|r| VersionRange::parse(r))
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", VersionRange::combine(&parsed));
            Ok(())
        }
    }
}

fn parse(input: &str) -> Result<()> {
    let range = VersionRange::parse(input)?;
    let float = range
        .float()
        .filter(|_| range.is_floating())
        .map_or_else(|| "none".to_string(), |f| format!("{:?}", f.behavior()));

    println!("normalized: {range}");
    println!("short:      {}", range.to_short_string());
    println!("legacy:     {}", range.to_legacy_string());
    println!("float:      {float}");
    println!("prerelease: {}", range.include_prerelease());
    Ok(())
}

fn satisfies(input: &str, versions: &[String]) -> Result<()> {
    let range = VersionRange::parse(input)?;
    for version in parse_versions(versions)? {
        let verdict = if range.satisfies(&version) { "yes" } else { "no" };
        println!("{version}: {verdict}");
    }
    Ok(())
}

fn best(input: &str, versions: &[String]) -> Result<()> {
    let range = VersionRange::parse(input)?;
    let candidates = parse_versions(versions)?;
    match range.find_best_match(&candidates) {
        Some(version) => println!("{version}"),
        None => println!("none"),
    }
    Ok(())
}

fn parse_versions(versions: &[String]) -> Result<Vec<Version>> {
    Ok(versions
        .iter()
        .map(|v| Version::parse(v))
        .collect::<Result<Vec<_>, _>>()?)
}

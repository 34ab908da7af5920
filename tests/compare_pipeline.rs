//! End-to-end runs of the compare step on quality tables written to a temp dir.

use std::path::Path;

use binconsolidate::{
    pipeline::{run, CompareConfig},
    ConsolidationMethod,
};

const HEADER: &str =
    "Name\tCompleteness\tContamination\tContig_Number\tContig_Names\tContig_Lengths\tStatus\n";

const BINS1: &str = "ident\t99.0\t0.5\t2\tc1, c2\t100, 200\tPass\n\
                     sup\t95.0\t1.0\t3\tc3, c4, c5\t100, 100, 100\tPass\n\
                     only1\t80.0\t2.0\t1\tc6\t500\tPass\n\
                     mix_a\t90.0\t1.0\t2\tc7, c8\t400, 100\tPass\n\
                     mix_b\t85.0\t1.0\t2\tc11, c12\t100, 100\tPass\n\
                     failed\t20.0\t30.0\t1\tc40\t100\tFail\n";

const BINS2: &str = "twin\t98.0\t0.5\t2\tc2, c1\t200, 100\tPass\n\
                     sub\t90.0\t1.0\t2\tc3, c4\t100, 100\tPass\n\
                     only2\t75.0\t3.0\t1\tc9\t50\tPass\n\
                     mix_x\t92.0\t1.0\t3\tc7, c10, c11\t400, 600, 100\tPass\n";

fn write_table(path: &Path, rows: &str) {
    std::fs::write(path, format!("{HEADER}{rows}")).unwrap();
}

fn config(dir: &Path, method: ConsolidationMethod) -> CompareConfig {
    let in1 = dir.join("bins1.tsv");
    let in2 = dir.join("bins2.tsv");
    write_table(&in1, BINS1);
    write_table(&in2, BINS2);
    CompareConfig {
        input_tsv1: in1,
        input_tsv2: in2,
        method,
        outdir: dir.join("out"),
        output_tsv1: dir.join("bins1.summary.tsv"),
        output_tsv2: dir.join("bins2.summary.tsv"),
        output_tsv3: dir.join("unified.summary.tsv"),
        missing: "NA".to_string(),
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_compare_writes_all_tables() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), ConsolidationMethod::Unify);
    run(&config).unwrap();

    let out = &config.outdir;
    for name in [
        "Results.Identical.tsv",
        "Results.Unique_Bins1.tsv",
        "Results.Unique_Bins2.tsv",
        "Results.Superset_Subset.tsv",
        "Results.Mixed_Bins1.tsv",
        "Results.Mixed_Bins2.tsv",
        "Results.Unify_Excluded.tsv",
        "Counts.bins1.mixed_comparisons.txt",
        "Counts.bins2.mixed_comparisons.txt",
        "Final.bins1.txt",
        "Final.bins2.txt",
    ] {
        assert!(out.join(name).exists(), "missing {name}");
    }
    assert!(out
        .join("pairwise-bin-results/bins1.mix_a.mixed_comparisons.txt")
        .exists());
    assert!(out
        .join("pairwise-bin-results/bins2.mix_x.mixed_comparisons.txt")
        .exists());

    let identical = read_lines(&out.join("Results.Identical.tsv"));
    assert_eq!(identical.len(), 2);
    let fields: Vec<&str> = identical[1].split('\t').collect();
    assert_eq!(fields.len(), 26);
    assert_eq!(&fields[..4], ["ident", "twin", "Identical", "Identical"]);
    assert_eq!(&fields[6..8], ["99.0", "98.0"]);
    assert_eq!(&fields[12..14], ["100", "100"]);
    assert_eq!(fields[17], "300");
    assert!(fields[18..].iter().all(|f| *f == "NA"));

    let superset = read_lines(&out.join("Results.Superset_Subset.tsv"));
    let fields: Vec<&str> = superset[1].split('\t').collect();
    assert_eq!(&fields[..4], ["sup", "sub", "Superset", "Subset"]);
    assert_eq!(&fields[12..14], ["100", "66"]);
}

#[test]
fn test_unify_keeps_only_reciprocal_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), ConsolidationMethod::Unify);
    let comparison = run(&config).unwrap();

    // mix_x is the best match of both mix_a and mix_b, but picks mix_a back
    assert_eq!(comparison.mixed1.len(), 2);
    assert_eq!(comparison.mixed2.len(), 1);

    let excluded = read_lines(&config.outdir.join("Results.Unify_Excluded.tsv"));
    assert_eq!(excluded.len(), 2);
    assert!(excluded[1].starts_with("bins1\tmix_b\t"));
    assert!(excluded[1].ends_with("\tmix_x"));

    let final1 = read_lines(&config.outdir.join("Final.bins1.txt"));
    let final2 = read_lines(&config.outdir.join("Final.bins2.txt"));
    assert_eq!(final1, vec!["ident", "only1", "sup"]);
    assert_eq!(final2, vec!["mix_x", "only2"]);

    // one row each: identical, superset, unified mixed, unique1, unique2
    let consolidated = read_lines(&config.output_tsv3);
    assert_eq!(consolidated.len(), 6);
}

#[test]
fn test_bins1_policy_keeps_all_bins1_mixed() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), ConsolidationMethod::Bins1);
    run(&config).unwrap();

    assert!(!config.outdir.join("Results.Unify_Excluded.tsv").exists());
    let final1 = read_lines(&config.outdir.join("Final.bins1.txt"));
    let final2 = read_lines(&config.outdir.join("Final.bins2.txt"));
    assert_eq!(final1, vec!["ident", "mix_a", "mix_b", "only1", "sup"]);
    assert_eq!(final2, vec!["only2"]);
}

#[test]
fn test_bins2_policy_keeps_bins2_mixed() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), ConsolidationMethod::Bins2);
    run(&config).unwrap();

    let final1 = read_lines(&config.outdir.join("Final.bins1.txt"));
    let final2 = read_lines(&config.outdir.join("Final.bins2.txt"));
    assert_eq!(final1, vec!["ident", "only1", "sup"]);
    assert_eq!(final2, vec!["mix_x", "only2"]);
}

#[test]
fn test_counts_written_when_nothing_is_mixed() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), ConsolidationMethod::Unify);
    write_table(&config.input_tsv1, "x\t90.0\t1.0\t1\tc1\t100\tPass\n");
    write_table(&config.input_tsv2, "y\t85.0\t1.0\t1\tc1\t100\tPass\n");
    run(&config).unwrap();

    for set in ["bins1", "bins2"] {
        let counts = read_lines(
            &config
                .outdir
                .join(format!("Counts.{set}.mixed_comparisons.txt")),
        );
        assert_eq!(counts, vec!["bin_name\tMixed-HS\tMixed-MS\tMixed-LS\tTotal"]);
    }
    assert_eq!(read_lines(&config.outdir.join("Final.bins1.txt")), vec!["x"]);
}

#[test]
fn test_duplicate_contig_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), ConsolidationMethod::Unify);
    write_table(
        &config.input_tsv2,
        "twin\t98.0\t0.5\t1\tc1\t100\tPass\nother\t90.0\t1.0\t1\tc1\t100\tPass\n",
    );

    let err = run(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("c1"));
}

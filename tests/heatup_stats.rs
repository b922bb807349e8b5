use oven_heatup::{report, scada::encode_utf16, Aggregator, SensorTargets};
use std::{fs, path::PathBuf};

fn log(date: &str, wu311: &[f64], wu312: &[f64]) -> String {
    let mut contents = String::from("Date\tTime\tOVEN\\WU311.ActValue\tOVEN\\WU312.ActValue\n");
    for (i, (a, b)) in wu311.iter().zip(wu312).enumerate() {
        contents.push_str(&format!(
            "{}\t 05:{:02}:00 AM\t{}\t{}\n",
            date,
            i * 3,
            a,
            b
        ));
    }
    contents
}

fn data_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("heatup-stats-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    // WU311 reaches 160C after 12 minutes
    fs::write(
        dir.join("020525_30s.CSV"),
        encode_utf16(&log(
            "02-May-25",
            &[40., 70., 100., 130., 165., 170.],
            &[40., 60., 80., 100., 120., 140.],
        )),
    )
    .unwrap();
    // WU311 reaches 160C after 18 minutes, with a corrupted row
    let mut contents = log(
        "28-Apr-25",
        &[40., 60., 80., 100., 120., 140., 160., 175.],
        &[40., 60., 80., 100., 120., 140., 160., 180.],
    );
    contents.push_str("28-Apr-25\tcorrupted\t200\t200\n");
    fs::write(dir.join("280425_30s.CSV"), contents).unwrap();
    fs::write(dir.join("summary_30s.CSV"), encode_utf16("Date\tTime\n")).unwrap();
    dir
}

#[test]
fn heatup_statistics() {
    let dir = data_dir();
    let targets = SensorTargets::default();
    let aggregator = Aggregator::new(&targets).run(&dir).unwrap();

    assert_eq!(aggregator.results().len(), 2);
    assert_eq!(aggregator.skipped().len(), 1);
    let days: Vec<_> = aggregator
        .results()
        .keys()
        .map(|d| d.to_string())
        .collect();
    assert_eq!(days, ["2025-04-28", "2025-05-02"]);
    let first_day = aggregator.results().values().next().unwrap();
    assert_eq!(first_day["WU311"].data_points, 8);

    let summary = aggregator.summary();
    let wu311 = &summary["WU311"];
    assert_eq!(wu311.count, 2);
    assert_eq!(wu311.avg_time, 15.);
    assert_eq!(wu311.min_time, 12.);
    assert_eq!(wu311.max_time, 18.);
    assert!(!summary.contains_key("WU312"));

    let output = dir.join("Analysis_Results");
    let (detail, stats) =
        report::write_reports(&output, aggregator.results(), &summary, &targets).unwrap();
    let detail = fs::read_to_string(detail).unwrap();
    let stats = fs::read_to_string(stats).unwrap();
    fs::remove_dir_all(&dir).unwrap();

    let april = detail.find("Date: 28-Apr-2025").unwrap();
    let may = detail.find("Date: 02-May-2025").unwrap();
    assert!(april < may);
    assert!(detail.contains("Time to Target: 18.0 minutes"));
    assert!(detail.contains("Target NOT reached during this session"));
    assert!(stats.contains("Average Time to Target: 15.0 ± 3.0 mins"));
    assert!(stats.contains("Range: 12.0 - 18.0 mins"));
    assert!(stats.contains("Earliest Start Time: 2025-04-28 05:00:00"));
    assert!(stats.contains("Latest Start Time: 2025-05-02 05:00:00"));
    assert!(!stats.contains("WU312"));
}

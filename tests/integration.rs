use std::{env, fs, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_fishtrap"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    let stdout_str =
        std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );
}

fn write_sim_dir(name: &str, harvest: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_contents = String::new()
        + "[trap]\n"
        + "radius = 25.0\n"
        + "height = 2.0\n"
        + "slope = 0.17\n"
        + "delta = 5.0\n"
        + "intercept = 6.0\n"
        + "\n"
        + "[model]\n"
        + "max_fish = 1000.0\n"
        + "movement_rate = 0.025\n"
        + "constant_population = false\n"
        + "\n"
        + "[harvest]\n"
        + harvest;
    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config file");

    // One week of semidiurnal tides, dipping below the trap twice a day.
    let mut tide_contents = String::from("Date,Height_m\n");
    for hour in 0..24 * 7 {
        let phase = 2.0 * std::f64::consts::PI * hour as f64 / 12.42;
        let height = 4.5 + 3.0 * phase.sin();
        tide_contents += &format!("day {} {:02}:00,{height:.3}\n", hour / 24, hour % 24);
    }
    fs::write(test_dir.join("tide.csv"), tide_contents).expect("failed to write tide file");

    test_dir
}

#[test]
fn basic_workflow() {
    let test_dir = write_sim_dir("basic_workflow", "strategy = \"percent\"\npercent = 50\n");
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--sim-dir", test_dir_str, "create"]);
    run_bin(&["--sim-dir", test_dir_str, "create"]);
    assert!(test_dir.join("run-0000").join("results.msgpack").is_file());
    assert!(test_dir.join("run-0001").join("results.msgpack").is_file());

    run_bin(&["--sim-dir", test_dir_str, "analyze"]);
    let analysis =
        fs::read_to_string(test_dir.join("analysis.toml")).expect("failed to read analysis");
    assert!(analysis.contains("run_idx = 1"));
    assert!(analysis.contains("total_harvested"));

    run_bin(&["--sim-dir", test_dir_str, "clean"]);
    assert!(!test_dir.join("run-0000").exists());
    assert!(!test_dir.join("analysis.toml").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn invalid_config_fails() {
    let test_dir = write_sim_dir("invalid_config_fails", "strategy = \"percent\"\npercent = 150\n");

    let output = Command::new(env!("CARGO_BIN_EXE_fishtrap"))
        .args(["--sim-dir", test_dir.to_str().unwrap(), "create"])
        .output()
        .expect("failed to execute command");
    assert!(!output.status.success());
    assert!(!test_dir.join("run-0000").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn verbose_create_logs_closures() {
    let test_dir = write_sim_dir("verbose_create_logs_closures", "strategy = \"full_catch\"\n");

    let output = Command::new(env!("CARGO_BIN_EXE_fishtrap"))
        .args(["-d", test_dir.to_str().unwrap(), "-v", "create"])
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute command");
    assert!(output.status.success());
    assert!(test_dir.join("run-0000").join("results.msgpack").is_file());

    let stderr_str = String::from_utf8_lossy(&output.stderr);
    assert!(stderr_str.contains("trap closed at hour"));
    assert!(stderr_str.contains("harvested"));

    fs::remove_dir_all(&test_dir).ok();
}

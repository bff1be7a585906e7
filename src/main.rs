use clap::{Arg, ArgAction, Command};
use tracing::info;

use fuzzsim::fuzzy::DefuzzifyMethod;
use fuzzsim::logging::{self, LogConfig, LogOutput};
use fuzzsim::models::{armory, AimErrorEstimator, IWeapon, Vector2D, Weapon, WeaponKind};
use fuzzsim::params::ParamTable;
use fuzzsim::scenario::ScenarioConfig;
use fuzzsim::simulation::SimulationEngine;

/// デモ表で使う目標距離
const DEMO_DISTANCES: [f64; 9] = [0.0, 15.0, 50.0, 100.0, 150.0, 200.0, 300.0, 500.0, 800.0];

fn main() {
    let matches = Command::new("fuzzsim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("ファジィ推論による武器選択シミュレーション")
        .long_about(
            "ファジィ推論で武器の望ましさと照準誤差を評価し、\n\
             ボットが標的を追跡・射撃するデモシミュレーションを実行します。",
        )
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定"),
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
                .conflicts_with("test"),
        )
        .arg(
            Arg::new("test")
                .short('t')
                .long("test")
                .action(ArgAction::SetTrue)
                .help("組み込みルールベースの評価表を表示")
                .conflicts_with("info"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)"),
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("TARGET")
                .value_parser(["console", "file", "both"])
                .default_value("console")
                .help("ログ出力先"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .help("ログレベル（省略時は -v の個数から決定）"),
        )
        .get_matches();

    let verbose_level = matches.get_count("verbose");

    let output = matches
        .get_one::<String>("log-output")
        .and_then(|s| s.parse::<LogOutput>().ok())
        .unwrap_or(LogOutput::Console);
    let level = matches
        .get_one::<String>("log-level")
        .map(|s| logging::parse_log_level(s))
        .unwrap_or_else(|| logging::level_for_verbosity(verbose_level));

    let log_config = LogConfig {
        level,
        output,
        ..LogConfig::default()
    };
    let _log_guard = match logging::init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ログ初期化エラー: {}", e);
            std::process::exit(1);
        }
    };

    println!("fuzzsim v{}", env!("CARGO_PKG_VERSION"));
    println!();

    if matches.get_flag("test") {
        if let Err(e) = run_demo() {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Some(scenario_path) = matches.get_one::<String>("scenario") {
        if let Err(e) = run_scenario(scenario_path, matches.get_flag("info"), verbose_level) {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
    } else {
        show_default_help();
    }
}

/// 組み込みルールベースの評価表を表示
fn run_demo() -> Result<(), Box<dyn std::error::Error>> {
    let params = ParamTable::default();

    println!("=== 武器の望ましさ（既定の弾数） ===");
    print!("{:<16}", "距離");
    for d in DEMO_DISTANCES {
        print!("{:>8.0}", d);
    }
    println!();

    for kind in WeaponKind::ALL {
        let mut weapon = Weapon::new(kind, &params)?;
        print!("{:<16}", kind.name());
        for d in DEMO_DISTANCES {
            print!("{:>8.1}", weapon.desirability(d));
        }
        println!("  (残弾 {})", weapon.rounds_remaining());
    }
    println!();

    println!("=== 照準誤差[rad]（目標速度 × 視認時間, 距離 100） ===");
    let mut estimator = AimErrorEstimator::new()?;
    let times = [0.5, 3.0, 8.0];
    print!("{:<16}", "速度＼視認");
    for t in times {
        print!("{:>8.1}", t);
    }
    println!();
    for speed in [0.0, 50.0, 100.0, 200.0] {
        print!("{:<16.0}", speed);
        for t in times {
            let deviation = estimator.estimate_deviation(100.0, Vector2D::new(speed, 0.0), t);
            print!("{:>8.3}", deviation);
        }
        println!();
    }
    println!();

    // 推論の中間値（ナイフ, 距離 150）
    let knife = armory::desirability_module(WeaponKind::Knife)?;
    let memberships = knife.fuzzify(&[(armory::DIST_TO_TARGET, 150.0)])?;
    let activations = knife.evaluate(&memberships);
    println!("=== ナイフ 距離150 の推論過程 ===");
    for set in ["Target_Close", "Target_Medium", "Target_Far"] {
        let degree = knife.membership(&memberships, armory::DIST_TO_TARGET, set).unwrap_or(0.0);
        println!("  {:<14} {:.3}", set, degree);
    }
    for set in ["Undesirable", "Desirable", "VeryDesirable"] {
        let degree = knife.activation(&activations, armory::DESIRABILITY, set).unwrap_or(0.0);
        println!("  → {:<12} {:.3}", set, degree);
    }
    println!(
        "  MaxAv = {:.2}, Centroid = {:.2}",
        knife.defuzzify(armory::DESIRABILITY, &activations, DefuzzifyMethod::MaxAv)?,
        knife.defuzzify(
            armory::DESIRABILITY,
            &activations,
            DefuzzifyMethod::Centroid { samples: 15 },
        )?,
    );

    info!("評価表を表示しました");
    Ok(())
}

/// シナリオファイルを読み込んで実行
fn run_scenario(
    scenario_path: &str,
    info_only: bool,
    verbose_level: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = ScenarioConfig::from_file(scenario_path)?;
    info!(path = scenario_path, "シナリオファイル読み込み完了");

    if info_only {
        scenario.print_summary();
        return Ok(());
    }

    scenario.print_summary();
    println!();

    let mut simulation = SimulationEngine::new(scenario, verbose_level)?;
    simulation.initialize()?;
    simulation.run().print_summary();

    Ok(())
}

/// デフォルトヘルプとシナリオ一覧を表示
fn show_default_help() {
    println!("使用方法:");
    println!("  fuzzsim [オプション]");
    println!();
    println!("オプション:");
    println!("  -s, --scenario <FILE>     シナリオファイルを指定して実行");
    println!("  -i, --info                シナリオ情報のみ表示");
    println!("  -t, --test                組み込みルールベースの評価表を表示");
    println!("  -v, --verbose             詳細出力 (複数指定で詳細レベル上昇)");
    println!("      --log-output <TARGET> ログ出力先 (console, file, both)");
    println!("      --log-level <LEVEL>   ログレベル (trace, debug, info, warn, error)");
    println!("  -h, --help                このヘルプを表示");
    println!();
    println!("利用可能なシナリオファイル:");
    println!("  scenarios/duel.yaml         - 静止標的との近距離戦");
    println!("  scenarios/arena_chase.yaml  - 障害物のあるアリーナで移動標的を追跡");
    println!();
    println!("例:");
    println!("  fuzzsim -s scenarios/duel.yaml");
    println!("  fuzzsim -s scenarios/arena_chase.yaml -vv --log-output both");
    println!("  fuzzsim -s scenarios/arena_chase.yaml -i");
    println!("  fuzzsim --test");
}

use activity_eraser::cli::Cli;
use activity_eraser::utils::logging;
use activity_eraser::{App, Config};
use anyhow::{Context, Result};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置：文件 → 环境变量 → 命令行
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env()?;
    cli.apply(&mut config);
    config.validate()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config).await.context("初始化失败")?;
    app.run().await.context("运行失败")?;

    Ok(())
}

use anyhow::Result;
use harvest_core::config::Config;

pub fn run(cfg: &Config, port: Option<u16>, open: bool) -> Result<()> {
    let port = port.unwrap_or(cfg.port);
    let cfg = cfg.clone();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!(
            "harvest dashboard → http://localhost:{actual_port}  (data: {})",
            cfg.data_dir.display()
        );
        harvest_server::serve_on(cfg, listener, open).await
    })
}

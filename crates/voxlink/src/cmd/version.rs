use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("voxlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: voxlink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("VOXLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: session={}, cli=true",
        cfg!(feature = "session")
    );
    println!(
        "defaults: listen={} chunk_size={} chunk_delay_ms={} max_payload={}",
        voxlink_transport::TcpLink::DEFAULT_ADDR,
        voxlink_frame::DEFAULT_CHUNK_SIZE,
        voxlink_frame::DEFAULT_CHUNK_DELAY.as_millis(),
        voxlink_frame::DEFAULT_MAX_PAYLOAD
    );

    Ok(SUCCESS)
}

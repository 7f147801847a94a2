fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto");

    tonic_prost_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(
            &[
                "proto/tks/common/v1/common.proto",
                "proto/tks/contract/v1/contract.proto",
                "proto/tks/info/v1/info.proto",
            ],
            &["proto"],
        )?;

    Ok(())
}

use std::{env, path::PathBuf, process::Command};

fn main() {
    println!("cargo::rustc-check-cfg=cfg(cuda_device)");
    println!("cargo:rerun-if-changed=src/cuda");
    println!("cargo:rerun-if-env-changed=NVCC");
    println!("cargo:rerun-if-env-changed=CUDA_ARCH");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));

    let nvcc = env::var("NVCC").unwrap_or_else(|_| "nvcc".to_string());
    let nvcc_available = Command::new(&nvcc).arg("--version").output().is_ok();

    if !nvcc_available {
        println!("cargo:warning=nvcc not found, building without the CUDA accelerator device");
        return;
    }

    // Jetson Orin default, override for desktop parts (sm_86, sm_89, ...)
    let arch = env::var("CUDA_ARCH").unwrap_or_else(|_| "sm_87".to_string());

    let kernels = ["src/cuda/kernels/block_matching.cu"];

    for kernel in kernels {
        let kpath = PathBuf::from(kernel);
        let name = kpath
            .file_stem()
            .and_then(|s| s.to_str())
            .expect("kernel path has no file stem");
        let ptx_file = out_dir.join(format!("{name}.ptx"));

        println!("cargo:warning=Compiling {kernel} → {name}.ptx");

        let status = Command::new(&nvcc)
            .arg("--ptx")
            .arg("-O3")
            .arg(format!("--gpu-architecture={arch}"))
            .arg("-o")
            .arg(&ptx_file)
            .arg(&kpath)
            .status();

        match status {
            Ok(s) if s.success() => {}
            _ => {
                println!("cargo:warning=Failed to compile {kernel}, CUDA device disabled");
                return;
            }
        }
    }

    println!("cargo:rustc-cfg=cuda_device");
}

//! Headless runner: load an iNES ROM, run N frames, dump state.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use famicore::cartridge::Cartridge;
use famicore::system::Nes;

#[derive(Parser, Debug)]
#[command(name = "famicore")]
#[command(about = "Headless NES core runner", long_about = None)]
struct Args {
    /// Path to the iNES ROM file
    #[arg(short, long)]
    rom: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value = "60")]
    frames: u64,

    /// Dump CPU state after execution
    #[arg(short = 'c', long)]
    dump_cpu: bool,

    /// Dump PPU state after execution
    #[arg(short = 'p', long)]
    dump_ppu: bool,
}

fn main() {
    let args = Args::parse();

    let cart = match Cartridge::from_ines_file(&args.rom) {
        Ok(cart) => cart,
        Err(e) => {
            eprintln!("Failed to load cartridge: {}", e);
            process::exit(1);
        }
    };

    let desc = cart.descriptor();
    println!("Loaded cartridge:");
    println!("  Mapper:  {} ({})", desc.mapper_id, cart.mapper_name());
    println!("  PRG ROM: {} KiB", desc.prg_rom_size / 1024);
    println!(
        "  CHR:     {}",
        if desc.chr_rom_size == 0 {
            "8 KiB RAM".to_string()
        } else {
            format!("{} KiB ROM", desc.chr_rom_size / 1024)
        }
    );
    println!("  Mirroring: {:?}", desc.mirroring);

    let mut nes = Nes::new();
    nes.insert_cartridge(cart);
    nes.reset();

    println!("\nRunning {} frames...", args.frames);
    for _ in 0..args.frames {
        nes.run_frame();
    }
    println!("Completed {} frames.", args.frames);

    if args.dump_cpu {
        let state = nes.cpu_state();
        println!("\nCPU state:");
        println!("  PC:  ${:04X}", state.pc);
        println!("  A:   ${:02X}", state.a);
        println!("  X:   ${:02X}", state.x);
        println!("  Y:   ${:02X}", state.y);
        println!("  SP:  ${:02X}", state.sp);
        println!("  P:   ${:02X}", state.status);
        println!("  CYC: {}", state.cycle);
    }

    if args.dump_ppu {
        let ppu = nes.ppu();
        println!("\nPPU state:");
        println!("  Scanline: {}", ppu.scanline());
        println!("  Dot:      {}", ppu.dot_in_scanline());
        println!("  Status:   {:?}", ppu.status());
        println!("  Frame:    buffer {}", nes.active_framebuffer_id());
    }
}

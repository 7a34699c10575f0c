#![no_main]

use bitstream::BitReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = BitReader::new(data);
    let mut idx = 0usize;

    // Input bytes drive a bounded sequence of reads.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 8;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_bool();
            }
            1 => {
                let bits = usize::from(data[idx - 1] % 64) + 1;
                let _ = reader.read_bits(bits);
            }
            2 => {
                let bits = usize::from(data[idx - 1] % 64) + 1;
                let _ = reader.read_signed_bits(bits);
            }
            3 => {
                let _ = reader.read_var_int();
            }
            4 => {
                let _ = reader.read_var_int_signed();
            }
            5 => {
                let _ = reader.read_ubit_var();
            }
            6 => {
                let _ = reader.read_string(None);
            }
            _ => {
                let position = usize::from(data[idx - 1]) * 3;
                let _ = reader.set_position(position);
            }
        }
    }
});

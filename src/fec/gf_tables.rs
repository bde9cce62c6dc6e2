use lazy_static::lazy_static;

// --- GF(2^4) Arithmetic ---

const GF4_POLY: u8 = 0x13; // x^4 + x + 1

const fn gf4_mul_slow(mut a: u8, mut b: u8) -> u8 {
    let mut res = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            res ^= a;
        }
        a <<= 1;
        if a & 0x10 != 0 {
            a ^= GF4_POLY;
        }
        b >>= 1;
    }
    res
}

const fn build_gf4_mul() -> [[u8; 16]; 16] {
    let mut table = [[0u8; 16]; 16];
    let mut a = 0;
    while a < 16 {
        let mut b = 0;
        while b < 16 {
            table[a][b] = gf4_mul_slow(a as u8, b as u8);
            b += 1;
        }
        a += 1;
    }
    table
}

const fn build_gf4_inv() -> [u8; 16] {
    let mut inv = [0u8; 16];
    let mut a = 1;
    while a < 16 {
        let mut b = 1;
        while b < 16 {
            if gf4_mul_slow(a as u8, b as u8) == 1 {
                inv[a] = b as u8;
            }
            b += 1;
        }
        a += 1;
    }
    inv
}

/// Maps a packed byte (two GF(2^4) elements) to its product with each scalar.
const fn build_gf4_byte_tables() -> [[u8; 256]; 16] {
    let mut tables = [[0u8; 256]; 16];
    let mut c = 0;
    while c < 16 {
        let mut b = 0;
        while b < 256 {
            let lo = gf4_mul_slow(c as u8, (b & 0x0f) as u8);
            let hi = gf4_mul_slow(c as u8, (b >> 4) as u8);
            tables[c][b] = lo | (hi << 4);
            b += 1;
        }
        c += 1;
    }
    tables
}

static GF4_MUL: [[u8; 16]; 16] = build_gf4_mul();
static GF4_INV: [u8; 16] = build_gf4_inv();
pub(crate) static GF4_BYTE_TABLES: [[u8; 256]; 16] = build_gf4_byte_tables();

#[inline(always)]
pub(crate) fn gf4_mul(a: u8, b: u8) -> u8 {
    GF4_MUL[(a & 0x0f) as usize][(b & 0x0f) as usize]
}

#[inline(always)]
pub(crate) fn gf4_inv(a: u8) -> u8 {
    if a & 0x0f == 0 {
        panic!("Inverse of 0 is undefined in GF(2^4)");
    }
    GF4_INV[(a & 0x0f) as usize]
}

// --- GF(2^8) Arithmetic ---

const GF_ORDER: usize = 256;
const IRREDUCIBLE_POLY: u16 = 0x11D; // x^8 + x^4 + x^3 + x^2 + 1

const fn build_gf_tables() -> ([u8; GF_ORDER], [u8; GF_ORDER * 2]) {
    let mut log = [0u8; GF_ORDER];
    let mut exp = [0u8; GF_ORDER * 2];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        exp[i + 255] = x as u8; // wrap-around, lets mul skip the modulo
        log[x as usize] = i as u8;
        x <<= 1;
        if x >= 256 {
            x ^= IRREDUCIBLE_POLY;
        }
        i += 1;
    }
    (log, exp)
}

const GF_TABLES: ([u8; GF_ORDER], [u8; GF_ORDER * 2]) = build_gf_tables();
static LOG_TABLE: [u8; GF_ORDER] = GF_TABLES.0;
static EXP_TABLE: [u8; GF_ORDER * 2] = GF_TABLES.1;

lazy_static! {
    /// One byte table per scalar: `GF_MUL_TABLES[c][x] = c * x`.
    pub(crate) static ref GF_MUL_TABLES: Box<[[u8; 256]; 256]> = {
        let mut tables = Box::new([[0u8; 256]; 256]);
        for (c, table) in tables.iter_mut().enumerate() {
            *table = gf_mul_table(c as u8);
        }
        tables
    };
}

#[inline(always)]
pub(crate) fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let sum_log = LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize;
    EXP_TABLE[sum_log]
}

/// Computes the multiplicative inverse of a in GF(2^8).
#[inline(always)]
pub(crate) fn gf_inv(a: u8) -> u8 {
    if a == 0 {
        panic!("Inverse of 0 is undefined in GF(2^8)");
    }
    EXP_TABLE[255 - LOG_TABLE[a as usize] as usize]
}

/// Builds `table[x] = a * x` in GF(2^8).
pub(crate) fn gf_mul_table(a: u8) -> [u8; 256] {
    let mut table = [0u8; 256];
    if a == 0 {
        return table;
    }
    let log_a = LOG_TABLE[a as usize] as usize;
    for x in 1..=255u8 {
        table[x as usize] = EXP_TABLE[log_a + LOG_TABLE[x as usize] as usize];
    }
    table
}

// --- GF(2^16) Arithmetic ---

const GF16_POLY: u32 = 0x1100b; // x^16 + x^12 + x^3 + x + 1
const GF16_ORDER: usize = 1 << 16;

struct Gf16Tables {
    log: Vec<u16>,
    exp: Vec<u16>,
}

lazy_static! {
    static ref GF16_TABLES: Gf16Tables = {
        let mut log = vec![0u16; GF16_ORDER];
        let mut exp = vec![0u16; (GF16_ORDER - 1) * 2];
        let mut x: u32 = 1;
        for i in 0..GF16_ORDER - 1 {
            exp[i] = x as u16;
            exp[i + GF16_ORDER - 1] = x as u16;
            log[x as usize] = i as u16;
            x <<= 1;
            if x & 0x10000 != 0 {
                x ^= GF16_POLY;
            }
        }
        Gf16Tables { log, exp }
    };
}

#[inline(always)]
pub(crate) fn gf16_mul(a: u16, b: u16) -> u16 {
    if a == 0 || b == 0 {
        return 0;
    }
    let tables = &*GF16_TABLES;
    tables.exp[tables.log[a as usize] as usize + tables.log[b as usize] as usize]
}

#[inline(always)]
pub(crate) fn gf16_inv(a: u16) -> u16 {
    if a == 0 {
        panic!("Inverse of 0 is undefined in GF(2^16)");
    }
    let tables = &*GF16_TABLES;
    tables.exp[GF16_ORDER - 1 - tables.log[a as usize] as usize]
}

/// Split product tables for a GF(2^16) scalar: `hi[x] = a * (x << 8)` and
/// `lo[x] = a * x`, so `a * v == hi[v >> 8] ^ lo[v & 0xff]`.
pub(crate) fn gf16_mul_tables(a: u16) -> ([u16; 256], [u16; 256]) {
    let mut hi = [0u16; 256];
    let mut lo = [0u16; 256];
    for x in 0..256u16 {
        hi[x as usize] = gf16_mul(a, x << 8);
        lo[x as usize] = gf16_mul(a, x);
    }
    (hi, lo)
}

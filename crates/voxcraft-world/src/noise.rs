/// Seeded simplex noise with fractal (multi-octave) sampling.
pub struct Simplex {
    /// Permutation table (doubled for wrapping).
    perm: [u8; 512],
}

const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

impl Simplex {
    pub fn new(seed: u64) -> Self {
        Self {
            perm: build_permutation(seed),
        }
    }

    /// Fractal 2D noise mapped to [0, 1].
    ///
    /// Each octave multiplies frequency by `lacunarity` and amplitude by
    /// `persistence`; the sum is normalized by the total amplitude.
    pub fn fractal2(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut freq = 1.0;
        let mut amp = 1.0;
        let mut max = 1.0;
        let mut total = self.simplex2(x, y);
        for _ in 1..octaves {
            freq *= lacunarity;
            amp *= persistence;
            max += amp;
            total += self.simplex2(x * freq, y * freq) * amp;
        }
        ((1.0 + total / max) / 2.0).clamp(0.0, 1.0)
    }

    /// Fractal 3D noise mapped to [0, 1].
    pub fn fractal3(
        &self,
        x: f64,
        y: f64,
        z: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
    ) -> f64 {
        let mut freq = 1.0;
        let mut amp = 1.0;
        let mut max = 1.0;
        let mut total = self.simplex3(x, y, z);
        for _ in 1..octaves {
            freq *= lacunarity;
            amp *= persistence;
            max += amp;
            total += self.simplex3(x * freq, y * freq, z * freq) * amp;
        }
        ((1.0 + total / max) / 2.0).clamp(0.0, 1.0)
    }

    /// 2D simplex noise. Returns value in [-1, 1].
    pub fn simplex2(&self, x: f64, y: f64) -> f64 {
        const F2: f64 = 0.5 * (1.7320508075688772 - 1.0); // (sqrt(3)-1)/2
        const G2: f64 = (3.0 - 1.7320508075688772) / 6.0; // (3-sqrt(3))/6

        let s = (x + y) * F2;
        let i = (x + s).floor();
        let j = (y + s).floor();

        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = y - (j - t);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i32 & 255) as usize;
        let jj = (j as i32 & 255) as usize;
        let p = &self.perm;

        let gi0 = p[ii + p[jj] as usize] as usize % 12;
        let gi1 = p[ii + i1 + p[jj + j1] as usize] as usize % 12;
        let gi2 = p[ii + 1 + p[jj + 1] as usize] as usize % 12;

        let n0 = corner2(gi0, x0, y0);
        let n1 = corner2(gi1, x1, y1);
        let n2 = corner2(gi2, x2, y2);

        // Scale to [-1, 1]
        70.0 * (n0 + n1 + n2)
    }

    /// 3D simplex noise. Returns value in [-1, 1].
    pub fn simplex3(&self, x: f64, y: f64, z: f64) -> f64 {
        const F3: f64 = 1.0 / 3.0;
        const G3: f64 = 1.0 / 6.0;

        let s = (x + y + z) * F3;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let k = (z + s).floor();

        let t = (i + j + k) * G3;
        let x0 = x - (i - t);
        let y0 = y - (j - t);
        let z0 = z - (k - t);

        // Which of the six tetrahedra the point falls in.
        let (o1, o2): ([usize; 3], [usize; 3]) = if x0 >= y0 {
            if y0 >= z0 {
                ([1, 0, 0], [1, 1, 0])
            } else if x0 >= z0 {
                ([1, 0, 0], [1, 0, 1])
            } else {
                ([0, 0, 1], [1, 0, 1])
            }
        } else if y0 < z0 {
            ([0, 0, 1], [0, 1, 1])
        } else if x0 < z0 {
            ([0, 1, 0], [0, 1, 1])
        } else {
            ([0, 1, 0], [1, 1, 0])
        };

        let offsets = [
            (x0, y0, z0),
            (
                x0 - o1[0] as f64 + G3,
                y0 - o1[1] as f64 + G3,
                z0 - o1[2] as f64 + G3,
            ),
            (
                x0 - o2[0] as f64 + 2.0 * G3,
                y0 - o2[1] as f64 + 2.0 * G3,
                z0 - o2[2] as f64 + 2.0 * G3,
            ),
            (x0 - 1.0 + 3.0 * G3, y0 - 1.0 + 3.0 * G3, z0 - 1.0 + 3.0 * G3),
        ];
        let corners = [[0, 0, 0], o1, o2, [1, 1, 1]];

        let ii = (i as i32 & 255) as usize;
        let jj = (j as i32 & 255) as usize;
        let kk = (k as i32 & 255) as usize;
        let p = &self.perm;

        let mut total = 0.0;
        for (corner, (dx, dy, dz)) in corners.iter().zip(offsets) {
            let gi = p[ii + corner[0] + p[jj + corner[1] + p[kk + corner[2]] as usize] as usize]
                as usize
                % 12;
            let t = 0.6 - dx * dx - dy * dy - dz * dz;
            if t > 0.0 {
                let g = GRAD3[gi];
                let t = t * t;
                total += t * t * (g[0] * dx + g[1] * dy + g[2] * dz);
            }
        }

        32.0 * total
    }
}

fn corner2(gi: usize, x: f64, y: f64) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        0.0
    } else {
        let t = t * t;
        let g = GRAD3[gi];
        t * t * (g[0] * x + g[1] * y)
    }
}

fn build_permutation(seed: u64) -> [u8; 512] {
    let mut p: [u8; 256] = [0; 256];
    for (i, val) in p.iter_mut().enumerate() {
        *val = i as u8;
    }

    // Fisher-Yates shuffle driven by a 64-bit LCG
    let mut rng = seed;
    for i in (1..256).rev() {
        rng = rng
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = (rng >> 33) as usize % (i + 1);
        p.swap(i, j);
    }

    let mut perm = [0u8; 512];
    for (i, val) in perm.iter_mut().enumerate() {
        *val = p[i & 255];
    }
    perm
}

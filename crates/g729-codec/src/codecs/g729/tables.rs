//! G.729 Tables
//!
//! Codebooks and filter coefficients. Tables that are a closed-form
//! function of their index (windows, grids, interpolation filters) are
//! computed once on first use.

use super::constants::*;
use once_cell::sync::Lazy;
use std::f32::consts::PI;

/// Asymmetric LPC analysis window
///
/// Half a 400-point Hamming window over the first 200 samples, a quarter
/// cosine period over the last 40.
pub static HAMWINDOW: Lazy<[f32; L_WINDOW]> = Lazy::new(|| {
    let mut w = [0.0f32; L_WINDOW];
    let rising = apodize::hamming_iter(400).take(200);
    let falling = apodize::cosine_iter(0.0, -1.0, 0.0, 0.0, 160).take(L_WINDOW - 200);
    for (dst, v) in w.iter_mut().zip(rising.chain(falling)) {
        *dst = v as f32;
    }
    w
});

/// Lag window with the white noise correction folded in
///
/// `LAG_WINDOW[i - 1]` multiplies `r[i]`.
pub static LAG_WINDOW: Lazy<[f32; M]> = Lazy::new(|| {
    let mut w = [0.0f32; M];
    for (i, dst) in w.iter_mut().enumerate() {
        let x = 2.0 * std::f64::consts::PI * 60.0 * (i + 1) as f64 / 8000.0;
        *dst = ((-0.5 * x * x).exp() / 1.0001) as f32;
    }
    w
});

/// Cosine grid for the LSP root search
pub static GRID: Lazy<[f32; GRID_POINTS + 1]> = Lazy::new(|| {
    let mut g = [0.0f32; GRID_POINTS + 1];
    for (i, dst) in g.iter_mut().enumerate() {
        *dst = (std::f64::consts::PI * i as f64 / GRID_POINTS as f64).cos() as f32;
    }
    g[0] = 0.9997559;
    g[GRID_POINTS] = -0.9997559;
    g
});

/// First stage LSP codebook (Q13)
const LSPCB1_Q13: [[i16; M]; NC0] = [
    [ 1486,  2168,  3751,  9074, 12134, 13944, 17983, 19173, 21190, 21820],
    [ 1730,  2640,  3450,  4870,  6126,  7876, 15644, 17817, 20294, 21902],
    [ 1568,  2256,  3088,  4874, 11063, 13393, 18307, 19293, 21109, 21741],
    [ 1733,  2512,  3357,  4708,  6977, 10296, 17024, 17956, 19145, 20350],
    [ 1744,  2436,  3308,  8731, 10432, 12007, 15614, 16639, 21359, 21913],
    [ 1786,  2369,  3372,  4521,  6795, 12963, 17674, 18988, 20855, 21640],
    [ 1631,  2433,  3361,  6328, 10709, 12013, 13277, 13904, 19441, 21088],
    [ 1489,  2364,  3291,  6250,  9227, 10403, 13843, 15278, 17721, 21451],
    [ 1869,  2533,  3475,  4365,  9152, 14513, 15908, 17022, 20611, 21411],
    [ 2070,  3025,  4333,  5854,  7805,  9231, 10597, 16047, 20109, 21834],
    [ 1910,  2673,  3419,  4261, 11168, 15111, 16577, 17591, 19310, 20265],
    [ 1141,  1815,  2624,  4623,  6495,  9588, 13968, 16428, 19351, 21286],
    [ 2192,  3171,  4707,  5808, 10904, 12500, 14162, 15664, 21124, 21789],
    [ 1286,  1907,  2548,  3453,  9574, 11964, 15978, 17344, 19691, 22495],
    [ 1921,  2720,  4604,  6684, 11503, 12992, 14350, 15262, 16997, 20791],
    [ 2052,  2759,  3897,  5246,  6638, 10267, 15834, 16814, 18149, 21675],
    [ 1798,  2497,  5617, 11449, 13189, 14711, 17050, 18195, 20307, 21182],
    [ 1009,  1647,  2889,  5709,  9541, 12354, 15231, 18494, 20966, 22033],
    [ 3016,  3794,  5406,  7469, 12488, 13984, 15328, 16334, 19952, 20791],
    [ 2203,  3040,  3796,  5442, 11987, 13512, 14931, 16370, 17856, 18803],
    [ 2912,  4292,  7988,  9572, 11562, 13244, 14556, 16529, 20004, 21073],
    [ 2861,  3607,  5923,  7034,  9234, 12054, 13729, 18056, 20262, 20974],
    [ 3069,  4311,  5967,  7367, 11482, 12699, 14309, 16233, 18333, 19172],
    [ 2434,  3661,  4866,  5798, 10383, 11722, 13049, 15668, 18862, 19831],
    [ 2020,  2605,  3860,  9241, 13275, 14644, 16010, 17099, 19268, 20251],
    [ 1877,  2809,  3590,  4707, 11056, 12441, 15622, 17168, 18761, 19907],
    [ 2107,  2873,  3673,  5799, 13579, 14687, 15938, 17077, 18890, 19831],
    [ 1612,  2284,  2944,  3572,  8219, 13959, 15924, 17239, 18592, 20117],
    [ 2420,  3156,  6542, 10215, 12061, 13534, 15305, 16452, 18717, 19880],
    [ 1667,  2612,  3534,  5237, 10513, 11696, 12940, 16798, 18058, 19378],
    [ 2388,  3017,  4839,  9333, 11413, 12730, 15024, 16248, 17449, 18677],
    [ 1875,  2786,  4231,  6320,  8694, 10149, 11785, 17013, 18608, 19960],
    [  679,  1411,  4654,  8006, 11446, 13249, 15763, 18127, 20361, 21567],
    [ 1838,  2596,  3578,  4608,  5650, 11274, 14355, 15886, 20579, 21754],
    [ 1303,  1955,  2395,  3322, 12023, 13764, 15883, 18077, 20180, 21232],
    [ 1438,  2102,  2663,  3462,  8328, 10362, 13763, 17248, 19732, 22344],
    [  860,  1904,  6098,  7775,  9815, 12007, 14821, 16709, 19787, 21132],
    [ 1673,  2723,  3704,  6125,  7668,  9447, 13683, 14443, 20538, 21731],
    [ 1246,  1849,  2902,  4508,  7221, 12710, 14835, 16314, 19335, 22720],
    [ 1525,  2260,  3862,  5659,  7342, 11748, 13370, 14442, 18044, 21334],
    [ 1196,  1846,  3104,  7063, 10972, 12905, 14814, 17037, 19922, 22636],
    [ 2147,  3106,  4475,  6511,  8227,  9765, 10984, 12161, 18971, 21300],
    [ 1585,  2405,  2994,  4036, 11481, 13177, 14519, 15431, 19967, 21275],
    [ 1778,  2688,  3614,  4680,  9465, 11064, 12473, 16320, 19742, 20800],
    [ 1862,  2586,  3492,  6719, 11708, 13012, 14364, 16128, 19610, 20425],
    [ 1395,  2156,  2669,  3386, 10607, 12125, 13614, 16705, 18976, 21367],
    [ 1444,  2117,  3286,  6233,  9423, 12981, 14998, 15853, 17188, 21857],
    [ 2004,  2895,  3783,  4897,  6168,  7297, 12609, 16445, 19297, 21465],
    [ 1495,  2863,  6360,  8100, 11399, 14271, 15902, 17711, 20479, 22061],
    [ 2484,  3114,  5718,  7097,  8400, 12616, 14073, 14847, 20535, 21396],
    [ 2424,  3277,  5296,  6284, 11290, 12903, 16022, 17508, 19333, 20283],
    [ 2565,  3778,  5360,  6989,  8782, 10428, 14390, 15742, 17770, 21734],
    [ 2727,  3384,  6613,  9254, 10542, 12236, 14651, 15687, 20074, 21102],
    [ 1916,  2953,  6274,  8088,  9710, 10925, 12392, 16434, 20010, 21183],
    [ 3384,  4366,  5349,  7667, 11180, 12605, 13921, 15324, 19901, 20754],
    [ 3075,  4283,  5951,  7619,  9604, 11010, 12384, 14006, 20658, 21497],
    [ 1751,  2455,  5147,  9966, 11621, 13176, 14739, 16470, 20788, 21756],
    [ 1442,  2188,  3330,  6813,  8929, 12135, 14476, 15306, 19635, 20544],
    [ 2294,  2895,  4070,  8035, 12233, 13416, 14762, 17367, 18952, 19688],
    [ 1937,  2659,  4602,  6697,  9071, 12863, 14197, 15230, 16047, 18877],
    [ 2071,  2663,  4216,  9445, 10887, 12292, 13949, 14909, 19236, 20341],
    [ 1740,  2491,  3488,  8138,  9656, 11153, 13206, 14688, 20896, 21907],
    [ 2199,  2881,  4675,  8527, 10051, 11408, 14435, 15463, 17190, 20597],
    [ 1943,  2988,  4177,  6039,  7478,  8536, 14181, 15551, 17622, 21579],
    [ 1825,  3175,  7062,  9818, 12824, 15450, 18330, 19856, 21830, 22412],
    [ 2464,  3046,  4822,  5977,  7696, 15398, 16730, 17646, 20588, 21320],
    [ 2550,  3393,  5305,  6920, 10235, 14083, 18143, 19195, 20681, 21336],
    [ 3003,  3799,  5321,  6437,  7919, 11643, 15810, 16846, 18119, 18980],
    [ 3455,  4157,  6838,  8199,  9877, 12314, 15905, 16826, 19949, 20892],
    [ 3052,  3769,  4891,  5810,  6977, 10126, 14788, 15990, 19773, 20904],
    [ 3671,  4356,  5827,  6997,  8460, 12084, 14154, 14939, 19247, 20423],
    [ 2716,  3684,  5246,  6686,  8463, 10001, 12394, 14131, 16150, 19776],
    [ 1945,  2638,  4130,  7995, 14338, 15576, 17057, 18206, 20225, 20997],
    [ 2304,  2928,  4122,  4824,  5640, 13139, 15825, 16938, 20108, 21054],
    [ 1800,  2516,  3350,  5219, 13406, 15948, 17618, 18540, 20531, 21252],
    [ 1436,  2224,  2753,  4546,  9657, 11245, 15177, 16317, 17489, 19135],
    [ 2319,  2899,  4980,  6936,  8404, 13489, 15554, 17281, 20270, 20911],
    [ 2939,  3895,  4935,  6076,  7543,  9233, 10979, 11970, 17679, 19931],
    [ 2286,  3063,  4078,  5191, 10262, 15043, 16454, 17547, 19318, 20072],
    [ 1794,  2580,  3416,  4427,  7779, 12549, 16064, 17357, 18611, 19711],
    [ 1836,  2510,  3347,  6050,  8979, 10489, 13905, 15223, 16476, 20097],
    [ 2225,  2959,  5167,  6813,  8107, 10078, 11734, 12953, 18693, 20938],
    [ 2042,  2844,  3776,  4785,  6177,  7458, 13007, 17157, 18758, 19945],
    [ 1998,  2797,  3746,  4789,  6165, 10237, 14129, 15147, 16390, 20136],
    [ 1951,  2738,  3779,  6190,  8195,  9522, 13197, 14279, 15399, 20297],
    [ 2059,  2873,  3852,  5144,  6585,  7908,  9390, 14627, 17709, 20001],
    [ 2111,  2855,  3718,  4680,  6026, 10893, 14013, 15095, 18398, 20733],
    [ 2331,  3127,  4118,  5136,  6406,  9200, 11245, 14878, 19617, 20811],
    [ 1783,  2590,  3381,  5069,  7669,  9108, 14437, 16133, 17449, 20658],
    [ 2242,  3225,  4140,  5150,  8280, 12093, 13466, 14522, 18290, 21114],
    [ 1633,  2397,  3276,  4297,  5440,  8817, 15318, 16678, 18103, 19894],
    [ 2493,  3316,  4187,  5148,  9097, 10665, 12126, 14896, 17047, 19561],
    [ 1755,  2490,  3293,  5563, 10221, 11484, 12784, 14189, 18548, 21286],
    [ 2147,  2975,  3776,  5008,  9869, 14044, 15319, 16410, 17687, 20455],
    [ 2612,  3474,  4303,  5294,  6611,  8040, 12913, 14306, 16019, 20683],
    [ 1874,  2636,  3478,  4562,  7406, 12101, 13396, 14454, 16224, 21125],
    [ 2461,  3181,  4094,  7357,  9206, 10548, 12147, 13513, 16934, 20398],
    [ 1922,  2711,  3582,  4452,  6063, 12574, 14090, 15115, 17339, 20969],
    [ 2567,  3483,  4482,  5494,  7084,  8538, 11312, 15776, 17633, 20079],
    [ 1686,  2456,  3273,  4139,  9153, 12896, 14372, 15437, 16791, 21368],
    [ 2366,  3051,  3934,  6124,  7526,  8887, 13689, 15094, 16455, 20566],
    [ 2053,  2936,  3861,  4920,  6271, 11639, 12930, 13974, 15726, 21054],
    [ 2749,  3552,  4526,  5617,  7023, 10327, 12139, 13318, 17938, 20317],
    [ 1705,  2525,  3477,  5870,  7617,  9080, 12059, 17297, 18881, 20358],
    [ 2275,  3146,  4168,  5304,  7908,  9355, 10688, 15935, 18134, 20060],
    [ 1871,  2742,  3591,  4485,  5606,  9604, 11147, 16870, 18947, 20604],
    [ 2459,  3300,  4173,  5101,  6213, 11708, 13304, 14413, 17017, 19574],
    [ 2116,  2866,  4497,  6117,  7488,  8842, 10210, 15640, 19232, 20491],
    [ 1572,  2390,  3384,  4592,  8488, 10243, 11661, 15307, 20237, 21517],
    [ 2592,  3284,  4459,  6664,  8162,  9553, 11171, 12621, 17458, 19992],
    [ 1987,  2745,  3532,  7192,  8701, 10092, 11678, 13127, 17909, 20859],
    [ 2381,  3315,  4275,  5362,  7079,  8416,  9767, 13419, 19533, 21219],
    [ 1779,  2578,  3467,  6508,  8117,  9557, 11181, 15849, 17466, 19305],
    [ 2245,  3028,  3895,  4821,  7317, 13150, 14583, 15591, 16991, 18933],
    [ 2680,  3488,  4331,  5350,  8737, 10147, 11579, 13146, 18862, 20487],
    [ 1962,  2816,  3827,  5051,  6542,  7868, 12381, 13713, 18720, 20982],
    [ 2426,  3214,  4098,  6455,  7873,  9220, 10639, 17362, 18964, 20187],
    [ 1817,  2632,  3532,  4502,  8007,  9468, 13258, 14553, 16043, 21623],
    [ 2838,  3686,  4558,  5591,  7005,  8371,  9708, 11260, 16877, 20420],
    [ 2193,  2954,  3762,  4766, 10936, 12374, 13693, 14844, 16312, 19752],
    [ 1681,  2480,  3392,  4379,  5502,  6957, 12751, 16117, 18154, 20823],
    [ 2522,  3344,  4216,  5245,  6604, 11033, 12449, 15876, 17372, 18752],
    [ 2011,  2806,  3646,  4599,  9634, 11109, 12549, 15900, 17373, 19085],
    [ 2325,  3100,  4005,  5975,  9491, 10887, 12210, 13440, 19972, 21131],
    [ 1903,  2700,  3552,  4546,  5845,  7150,  8481, 16579, 19395, 20806],
    [ 2635,  3387,  4290,  5443,  6751,  9859, 11323, 12614, 18445, 19859],
    [ 2156,  2907,  3728,  6860,  8291,  9702, 11212, 12720, 14252, 20468],
    [ 2138,  2826,  3671,  4697,  6050,  7372,  8660, 12587, 19244, 21245],
];

/// Second stage LSP codebook (Q13)
const LSPCB2_Q13: [[i16; M]; NC1] = [
    [ -435,  -815,  -742,  1033,  -518,   582, -1201,   829,    86,   385],
    [ -833,  -891,   463,    -8, -1251,  1450,    72,  -231,   864,   661],
    [-1021,   231,  -306,   321,  -220,  -163,  -526,  -754, -1633,   267],
    [   57,  -198,  -339,   -33, -1468,   573,   796,  -169,  -631,   816],
    [  171,  -350,   294,  1660,   453,   519,   291,   159,  -640, -1296],
    [ -701,  -842,   -58,   950,   892,  1549,   715,   527,  -714,  -193],
    [  584,    31,  -289,   356,  -333,  -457,   612,  -283, -1381,  -741],
    [ -109,  -808,   231,    77,   -87,  -344,  1341,  1087,  -654,  -569],
    [ -859,  1236,   550,   854,   714,  -543, -1752,  -195,   -98,  -276],
    [ -877,  -954, -1248,  -299,   212,  -235,  -728,   949,  1517,   895],
    [  -77,   344,  -620,   763,   413,   502,  -362,  -960,  -483,  1386],
    [ -314,  -307,  -256, -1260,  -429,   450,  -466,  -108,  1010,  2223],
    [  711,   693,   521,   650,  1305,   -28,  -378,   744, -1005,   240],
    [ -112,  -271,  -500,   946,  1733,   271,   -15,   909,  -259,  1688],
    [  575,   -10,  -468,  -199,  1101, -1011,   581,   -53,  -747,   878],
    [  145,  -285, -1280,  -398,    36,  -498, -1377,    18,  -444,  1483],
    [-1133,  -835,  1350,  1284,   -95,  1015,  -222,   443,   372,  -354],
    [-1459, -1237,   416,  -213,   466,   669,   659,  1640,   932,   534],
    [  -15,    66,   468,  1019,  -748,  1385,  -182,  -907,  -721,  -262],
    [ -338,   148,  1445,    75,  -760,   569,  1247,   337,   416,  -121],
    [  389,   239,  1568,   981,   113,   369, -1003,  -507,  -587,  -904],
    [ -312,   -98,   949,    31,  1104,    72,  -141,  1465,    63,  -785],
    [ 1127,   584,   835,   277, -1159,   208,   301,  -882,   117,  -404],
    [  539,   363,  1180,   277,   -42,   -32, -1019,    74,   115,  1202],
    [ -584,   107,  1079, -1217,   236,  -224,   139,  -393,  -121,   -86],
    [-1009, -1182,  -339,  1177,  -142,   145,   -45,  -229,   -53,   -69],
    [   76,   210,   -77,  1138,    59,   198,   268,   161,  -174,  -173],
    [-1139,   -17,   -29,  -362,   299,   -40,  -165,   110,   119,    17],
    [ -299,  -212,   157,   262,  -183,   -58,    57,  -318,   -89,   184],
    [  -72,    39,   -13,   114,  -174,   -14,   186,   -18,  -117,   -50],
    [ -221,    81,   195,  -110,  -138,   266,  -136,  -111,   242,   -55],
    [  112,   -51,  -231,    98,   177,  -202,   -82,   270,   178,   195],
];

/// First stage LSP codebook (radians)
pub static LSPCB1: Lazy<[[f32; M]; NC0]> = Lazy::new(|| from_q13(&LSPCB1_Q13));

/// Second stage LSP codebook (radians)
pub static LSPCB2: Lazy<[[f32; M]; NC1]> = Lazy::new(|| from_q13(&LSPCB2_Q13));

fn from_q13<const N: usize>(table: &[[i16; M]; N]) -> [[f32; M]; N] {
    let mut out = [[0.0f32; M]; N];
    for (dst, src) in out.iter_mut().zip(table.iter()) {
        for (d, &s) in dst.iter_mut().zip(src.iter()) {
            *d = f32::from(s) / 8192.0;
        }
    }
    out
}

/// MA predictor coefficients (Q15), per mode and per past frame
const FG_Q15: [[[i16; M]; MA_NP]; MODE] = [
    [
        [8421, 9109, 9175, 8965, 9034, 9057, 8765, 8775, 9106, 8673],
        [7018, 7189, 7638, 7307, 7444, 7379, 7038, 6956, 6930, 6868],
        [5472, 4990, 5134, 5177, 5246, 5141, 5206, 5095, 4830, 5147],
        [4056, 3031, 2614, 3024, 2916, 2713, 3309, 3237, 2857, 3473],
    ],
    [
        [7733, 7880, 8188, 8175, 8247, 8490, 8637, 8601, 8359, 7569],
        [4210, 3031, 2552, 3473, 3876, 3853, 4184, 4154, 3909, 3968],
        [3214, 1930, 1313, 2143, 2493, 2385, 2755, 2706, 2542, 2919],
        [3024, 1592,  940, 1631, 1723, 1579, 2034, 2084, 1913, 2601],
    ],
];

/// MA predictor coefficients
pub static FG: Lazy<[[[f32; M]; MA_NP]; MODE]> = Lazy::new(|| {
    let mut fg = [[[0.0f32; M]; MA_NP]; MODE];
    for (mode, rows) in fg.iter_mut().enumerate() {
        for (k, row) in rows.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = f32::from(FG_Q15[mode][k][j]) / 32768.0;
            }
        }
    }
    fg
});

/// `1 - Σ fg` per mode and coefficient, the weight of the current residual
pub static FG_SUM: Lazy<[[f32; M]; MODE]> = Lazy::new(|| {
    let mut sum = [[1.0f32; M]; MODE];
    for (mode, row) in sum.iter_mut().enumerate() {
        for (j, v) in row.iter_mut().enumerate() {
            for k in 0..MA_NP {
                *v -= FG[mode][k][j];
            }
        }
    }
    sum
});

/// Reciprocal of [`FG_SUM`]
pub static FG_SUM_INV: Lazy<[[f32; M]; MODE]> = Lazy::new(|| {
    let mut inv = [[0.0f32; M]; MODE];
    for (dst, src) in inv.iter_mut().zip(FG_SUM.iter()) {
        for (d, &s) in dst.iter_mut().zip(src.iter()) {
            *d = 1.0 / s;
        }
    }
    inv
});

/// LSF vector the MA history is reset to
pub static FREQ_PREV_RESET: Lazy<[f32; M]> = Lazy::new(|| {
    let mut lsf = [0.0f32; M];
    for (i, v) in lsf.iter_mut().enumerate() {
        *v = (i + 1) as f32 * PI / (M + 1) as f32;
    }
    lsf
});

/// Interpolation filter for the fractional pitch correlation (1/3 resolution)
pub const INTER_3: [f32; UP_SAMP * L_INTER4 + 1] = [
    0.900839, 0.760084, 0.424293, 0.084323, -0.105263, -0.121217, -0.047395,
    0.016407, 0.031277, 0.015349, 0.000000, -0.005765, -0.005432,
];

/// Interpolation filter for the adaptive codebook excitation (1/3 resolution)
pub const INTER_3L: [f32; UP_SAMP * L_INTER10 + 1] = [
    0.898517, 0.769271, 0.448635, 0.095915, -0.134333, -0.178528, -0.084919,
    0.036952, 0.095533, 0.068936, 0.000000, -0.050404, -0.050835, -0.014169,
    0.023083, 0.033543, 0.016774, -0.007466, -0.019340, -0.013755, 0.000000,
    0.009400, 0.009029, 0.002381, -0.003658, -0.005027, -0.002405, 0.001050,
    0.002780, 0.002145, 0.000000,
];

/// First gain codebook, `[pitch gain, code gain correction]`
pub const GBK1: [[f32; 2]; NCODE1] = [
    [0.000010, 0.185084],
    [0.094719, 0.296035],
    [0.111779, 0.613122],
    [0.003516, 0.659780],
    [0.117258, 1.134277],
    [0.197901, 1.214512],
    [0.021772, 1.801288],
    [0.163457, 3.315700],
];

/// Second gain codebook, `[pitch gain, code gain correction]`
pub const GBK2: [[f32; 2]; NCODE2] = [
    [0.050466, 0.244769],
    [0.121711, 0.000010],
    [0.313871, 0.072357],
    [0.375977, 0.292399],
    [0.493870, 0.593410],
    [0.556641, 0.064087],
    [0.645363, 0.362118],
    [0.706138, 0.146001],
    [0.809357, 0.397579],
    [0.866379, 0.199081],
    [0.923602, 0.534458],
    [0.986423, 0.160636],
    [1.055900, 0.227241],
    [1.158044, 0.724583],
    [1.215575, 0.085187],
    [1.347932, 0.392752],
];

/// Codebook row to transmitted index, first gain codebook
pub const MAP1: [usize; NCODE1] = [5, 1, 4, 7, 3, 0, 6, 2];

/// Transmitted index to codebook row, first gain codebook
pub const IMAP1: [usize; NCODE1] = [5, 1, 7, 4, 2, 0, 6, 3];

/// Codebook row to transmitted index, second gain codebook
pub const MAP2: [usize; NCODE2] = [4, 6, 0, 2, 12, 14, 8, 10, 15, 11, 9, 13, 7, 3, 1, 5];

/// Transmitted index to codebook row, second gain codebook
pub const IMAP2: [usize; NCODE2] = [2, 14, 3, 13, 0, 15, 1, 12, 6, 10, 7, 9, 4, 11, 5, 8];

/// Presearch thresholds of the first gain codebook
pub const THR1: [f32; NCODE1 - NCAN1] = [0.659681, 0.755274, 1.207205, 1.987740];

/// Presearch thresholds of the second gain codebook
pub const THR2: [f32; NCODE2 - NCAN2] = [
    0.429912, 0.494045, 0.618737, 0.650676, 0.717949, 0.770050, 0.850628, 0.932089,
];

/// Presearch projection coefficients
pub const COEF: [[f32; 2]; 2] = [[31.134575, 1.612322], [0.481389, 0.053056]];

/// Presearch projection normaliser
pub const INV_COEF: f32 = -0.032623;

/// MA energy predictor of the code gain
pub const PRED: [f32; 4] = [0.68, 0.58, 0.34, 0.19];

/// 140 Hz input high-pass, numerator
pub const B140: [f32; 3] = [0.92727435, -1.8544941, 0.92727435];

/// 140 Hz input high-pass, denominator (`y = a1*y1 + a2*y2 + ...`)
pub const A140: [f32; 3] = [1.0, 1.9059465, -0.9114024];

/// 100 Hz output high-pass, numerator
pub const B100: [f32; 3] = [0.93980581, -1.8795834, 0.93980581];

/// 100 Hz output high-pass, denominator (`y = a1*y1 + a2*y2 + ...`)
pub const A100: [f32; 3] = [1.0, 1.9330735, -0.93589199];

/// Short fractional delay filters of the postfilter, one row per phase
pub static TAB_HUP_S: Lazy<[[f32; LH2_S]; F_UP_PST - 1]> =
    Lazy::new(|| fractional_filters::<LH2_S>());

/// Long fractional delay filters of the postfilter, one row per phase
pub static TAB_HUP_L: Lazy<[[f32; LH2_L]; F_UP_PST - 1]> =
    Lazy::new(|| fractional_filters::<LH2_L>());

/// Hamming-windowed sinc interpolators for the phases 1/8 .. 7/8
fn fractional_filters<const N: usize>() -> [[f32; N]; F_UP_PST - 1] {
    let half = (N / 2) as f64;
    let mut tab = [[0.0f32; N]; F_UP_PST - 1];
    for (p, row) in tab.iter_mut().enumerate() {
        let phi = (p + 1) as f64 / F_UP_PST as f64;
        for (i, h) in row.iter_mut().enumerate() {
            let d = half - i as f64 - phi;
            let x = std::f64::consts::PI * d;
            let sinc = if x.abs() < 1e-9 { 1.0 } else { x.sin() / x };
            let window = 0.54 + 0.46 * (x / half).cos();
            *h = (sinc * window) as f32;
        }
    }
    tab
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_window_shape() {
        let w = &*HAMWINDOW;
        assert!((w[0] - 0.08).abs() < 1e-4);
        assert!((w[199] - 1.0).abs() < 1e-4);
        assert!((w[200] - 1.0).abs() < 1e-6);
        assert!(w[239] < 0.04 && w[239] > 0.0);
        for n in 1..200 {
            assert!(w[n] >= w[n - 1]);
        }
        for n in 201..L_WINDOW {
            assert!(w[n] < w[n - 1]);
        }
    }

    #[test]
    fn test_lag_window() {
        assert!((LAG_WINDOW[0] - 0.99879038).abs() < 1e-6);
        assert!((LAG_WINDOW[9] - 0.89481964).abs() < 1e-5);
    }

    #[test]
    fn test_grid_is_descending() {
        for i in 1..=GRID_POINTS {
            assert!(GRID[i] < GRID[i - 1]);
        }
    }

    #[test]
    fn test_gain_maps_are_inverse() {
        for i in 0..NCODE1 {
            assert_eq!(IMAP1[MAP1[i]], i);
        }
        for i in 0..NCODE2 {
            assert_eq!(IMAP2[MAP2[i]], i);
        }
    }

    #[test]
    fn test_first_stage_codebook_is_ordered() {
        for row in LSPCB1.iter() {
            for j in 1..M {
                assert!(row[j] > row[j - 1]);
            }
            assert!(row[M - 1] < PI);
        }
    }

    #[test]
    fn test_fg_sum_matches_inverse() {
        for mode in 0..MODE {
            for j in 0..M {
                assert!(FG_SUM[mode][j] > 0.0);
                assert!((FG_SUM[mode][j] * FG_SUM_INV[mode][j] - 1.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_fractional_filters() {
        let s = &*TAB_HUP_S;
        assert!((s[0][0] + 0.005772).abs() < 1e-5);
        assert!((s[0][2] - 0.965882).abs() < 1e-5);
        for row in TAB_HUP_L.iter() {
            let dc: f32 = row.iter().sum();
            assert!((dc - 1.0).abs() < 0.05);
        }
    }
}

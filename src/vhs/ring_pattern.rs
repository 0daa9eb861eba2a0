/// Frequency-domain magnitude profile of a band-limited tape channel.
///
/// Sampled at 512 points across the shifted horizontal spectrum (DC in the
/// middle). Ringing v2 resamples this to the field width and raises it to a
/// power, so the values must not change between releases.
pub static RING_PATTERN: [f32; 512] = [
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000010, 0.000111,
    0.000323, 0.000645, 0.001078, 0.001623, 0.002280, 0.003049, 0.003932, 0.004930,
    0.006043, 0.007273, 0.008619, 0.010082, 0.011663, 0.013361, 0.015175, 0.017105,
    0.019149, 0.021307, 0.023574, 0.025950, 0.028431, 0.031013, 0.033694, 0.036468,
    0.039333, 0.042285, 0.045319, 0.048431, 0.051619, 0.054880, 0.058210, 0.061609,
    0.065075, 0.068608, 0.072209, 0.075880, 0.079624, 0.083443, 0.087344, 0.091332,
    0.095413, 0.099594, 0.103883, 0.108289, 0.112819, 0.117481, 0.122284, 0.127235,
    0.132340, 0.137605, 0.143035, 0.148630, 0.154393, 0.160323, 0.166415, 0.172664,
    0.179063, 0.185601, 0.192265, 0.199041, 0.205911, 0.212857, 0.219858, 0.226893,
    0.233939, 0.240973, 0.247972, 0.254913, 0.261775, 0.268538, 0.275183, 0.281696,
    0.288063, 0.294276, 0.300331, 0.306226, 0.311965, 0.317557, 0.323015, 0.328357,
    0.333606, 0.338789, 0.343937, 0.349084, 0.354268, 0.359530, 0.364910, 0.370452,
    0.376197, 0.382186, 0.388458, 0.395050, 0.401993, 0.409315, 0.417035, 0.425170,
    0.433726, 0.442703, 0.452090, 0.461870, 0.472017, 0.482495, 0.493260, 0.504259,
    0.515434, 0.526717, 0.538038, 0.549320, 0.560483, 0.571446, 0.582127, 0.592448,
    0.602331, 0.611704, 0.620502, 0.628668, 0.636154, 0.642923, 0.648952, 0.654229,
    0.658757, 0.662555, 0.665656, 0.668106, 0.669969, 0.671320, 0.672248, 0.672856,
    0.673253, 0.673559, 0.673900, 0.674405, 0.675206, 0.676432, 0.678211, 0.680661,
    0.683893, 0.688005, 0.693083, 0.699194, 0.706388, 0.714692, 0.724115, 0.734639,
    0.746227, 0.758814, 0.772316, 0.786623, 0.801606, 0.817116, 0.832985, 0.849035,
    0.865070, 0.880892, 0.896294, 0.911071, 0.925019, 0.937943, 0.949660, 0.960001,
    0.968816, 0.975980, 0.981392, 0.984982, 0.986709, 0.986566, 0.984583, 0.980820,
    0.975376, 0.968382, 0.960002, 0.950430, 0.939889, 0.928623, 0.916899, 0.904998,
    0.893210, 0.881834, 0.871163, 0.861487, 0.853084, 0.846210, 0.841102, 0.837965,
    0.836971, 0.838253, 0.841904, 0.847970, 0.856451, 0.867298, 0.880415, 0.895654,
    0.912824, 0.931688, 0.951968, 0.973350, 0.995487, 1.000000, 1.000000, 1.000000,
    1.000000, 1.000000, 1.000000, 1.000000, 1.000000, 1.000000, 1.000000, 1.000000,
    1.000000, 1.000000, 1.000000, 1.000000, 1.000000, 1.000000, 1.000000, 1.000000,
    1.000000, 1.000000, 1.000000, 0.995487, 0.973350, 0.951968, 0.931688, 0.912824,
    0.895654, 0.880415, 0.867298, 0.856451, 0.847970, 0.841904, 0.838253, 0.836971,
    0.837965, 0.841102, 0.846210, 0.853084, 0.861487, 0.871163, 0.881834, 0.893210,
    0.904998, 0.916899, 0.928623, 0.939889, 0.950430, 0.960002, 0.968382, 0.975376,
    0.980820, 0.984583, 0.986566, 0.986709, 0.984982, 0.981392, 0.975980, 0.968816,
    0.960001, 0.949660, 0.937943, 0.925019, 0.911071, 0.896294, 0.880892, 0.865070,
    0.849035, 0.832985, 0.817116, 0.801606, 0.786623, 0.772316, 0.758814, 0.746227,
    0.734639, 0.724115, 0.714692, 0.706388, 0.699194, 0.693083, 0.688005, 0.683893,
    0.680661, 0.678211, 0.676432, 0.675206, 0.674405, 0.673900, 0.673559, 0.673253,
    0.672856, 0.672248, 0.671320, 0.669969, 0.668106, 0.665656, 0.662555, 0.658757,
    0.654229, 0.648952, 0.642923, 0.636154, 0.628668, 0.620502, 0.611704, 0.602331,
    0.592448, 0.582127, 0.571446, 0.560483, 0.549320, 0.538038, 0.526717, 0.515434,
    0.504259, 0.493260, 0.482495, 0.472017, 0.461870, 0.452090, 0.442703, 0.433726,
    0.425170, 0.417035, 0.409315, 0.401993, 0.395050, 0.388458, 0.382186, 0.376197,
    0.370452, 0.364910, 0.359530, 0.354268, 0.349084, 0.343937, 0.338789, 0.333606,
    0.328357, 0.323015, 0.317557, 0.311965, 0.306226, 0.300331, 0.294276, 0.288063,
    0.281696, 0.275183, 0.268538, 0.261775, 0.254913, 0.247972, 0.240973, 0.233939,
    0.226893, 0.219858, 0.212857, 0.205911, 0.199041, 0.192265, 0.185601, 0.179063,
    0.172664, 0.166415, 0.160323, 0.154393, 0.148630, 0.143035, 0.137605, 0.132340,
    0.127235, 0.122284, 0.117481, 0.112819, 0.108289, 0.103883, 0.099594, 0.095413,
    0.091332, 0.087344, 0.083443, 0.079624, 0.075880, 0.072209, 0.068608, 0.065075,
    0.061609, 0.058210, 0.054880, 0.051619, 0.048431, 0.045319, 0.042285, 0.039333,
    0.036468, 0.033694, 0.031013, 0.028431, 0.025950, 0.023574, 0.021307, 0.019149,
    0.017105, 0.015175, 0.013361, 0.011663, 0.010082, 0.008619, 0.007273, 0.006043,
    0.004930, 0.003932, 0.003049, 0.002280, 0.001623, 0.001078, 0.000645, 0.000323,
    0.000111, 0.000010, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
];

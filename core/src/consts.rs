// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Historical bytes sent in the answer to reset
pub const ATR_HISTORICAL: &[u8] = b"bourse";

/// Applet version string
pub const VERSION: &str = "1.00";

/// Command payload buffer size
pub const BUFF_LEN: usize = 32;

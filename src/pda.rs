//! Program-derived address helpers

use solana_sdk::pubkey::Pubkey;

/// SPL Token program
pub const TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// SPL Associated Token Account program
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Derive the canonical associated token account address for `mint` held
/// by `owner`
///
/// Pure function of its inputs, no I/O. This is the standard derivation
/// scheme; callers integrating a different token stack can substitute
/// their own via [`crate::resolver::Resolver::with_ata_derivation`].
pub fn associated_token_address(mint: &Pubkey, owner: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            owner.as_ref(),
            TOKEN_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

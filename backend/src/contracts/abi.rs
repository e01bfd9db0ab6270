//! Human-readable ABIs of the two deployed contracts.
//!
//! Only the methods the API exposes are listed. Output names double as
//! the JSON field names of read responses, so keep them camelCase.

/// OptionToken: an ERC-20 style option position bound to a Uniswap pool.
pub const OPTION_TOKEN_ABI: &[&str] = &[
    "function initialize((uint256,uint256,uint256,bool) optionData, string name, string symbol, address poolAddress, uint256 asset1Amt, uint256 asset2Amt, address admin)",
    "function adminTransfer(address from, address to, uint256 amount)",
    "function burn(address account, uint256 amount)",
    "function calculateProfit(address user, uint256 amount) view returns (bool profitable, uint256 profit)",
    "function getAsset1Price() view returns (uint256 price)",
    "function convertAsset2ToAsset1(uint256 amount) view returns (uint256 convertedAmount)",
    "function terms() view returns (uint256 strikePrice, uint256 premium, uint256 expiry, bool isCall, address uniswapPool, address creator, uint256 asset1Reserve, uint256 asset2Reserve)",
];

/// OptionsVault: locks LP positions and mints/settles option tokens.
pub const OPTIONS_VAULT_ABI: &[&str] = &[
    "function createOption(uint256 tokenId, uint256 strikePrice, uint256 premium, uint256 expiry, bool isCall)",
    "function buyOption(address optionAddress, uint256 amount)",
    "function exerciseOption(address optionAddress, uint256 amount)",
    "function claimTokens(address optionAddress)",
    "function calculatePremium(address optionAddress, uint256 amount) view returns (uint256 premium)",
    "function optionByAddress(address optionAddress) view returns (address creator, uint256 tokenId, uint256 asset1Amount, uint256 asset2Amount)",
    "function getUniswapNFTManager() view returns (address nftManagerAddress)",
    "function getUniswapV3Factory() view returns (address factoryAddress)",
];

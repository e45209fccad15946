//! Definitions of Solidity functions called by the scripts

use alloy::sol;

sol! {
    /// The initializer shared by the upgradeable contracts
    function initialize(address initiator) external;
}

sol! {
    #[sol(rpc)]
    interface ITaggr {
        function setTaggrSettings(address settings) external;
        function setNftDistributor(address distributor) external;
        function registerNftFactory(uint256 factoryId, address factory) external;
        function managerUpdateCustomerAccount(address customer, uint256 planType) external;
        function toggleCustomerSelfServe(address customer, bool state) external;
        function managerLaunchNewProject(
            address owner,
            string projectId,
            string projectName,
            string projectSymbol,
            string baseTokenUri,
            uint256 nftFactoryId,
            uint256 max,
            uint256 royalties
        ) external;
        function getProjectContract(string projectId) external view returns (address);
    }

    #[sol(rpc)]
    interface ITaggrSettings {
        function setMembershipFee(uint256 fee) external;
        function setProjectLaunchFee(uint256 fee) external;
        function setMembershipFeeToken(address token) external;
        function setProjectLaunchFeeToken(address token) external;
        function setMintingFeeByPlanType(uint256 planType, uint256 fee) external;
    }

    #[sol(rpc)]
    interface ICustomerSettings {
        function setTaggr(address taggr) external;
        function setNftDistributor(address distributor) external;
        function setProjectPurchaseFee(string projectId, address token, uint256 fee) external;
        function setProjectFreeMint(string projectId, address account, uint256 count) external;
    }

    #[sol(rpc)]
    interface INftDistributor {
        function setTaggr(address taggr) external;
        function setTaggrSettings(address settings) external;
        function setCustomerSettings(address settings) external;
        function setTokenEscrow(address escrow) external;
        function setMerkleRoot(string projectId, bytes32 root) external;
        function setMerkleRootForProject(string projectId, bytes32 root) external;
    }

    #[sol(rpc)]
    interface ITokenEscrow {
        function setNftDistributor(address distributor) external;
    }

    #[sol(rpc)]
    interface ITaggrFactoryLazy721 {
        function setDeployer(address deployer) external;
    }

    #[sol(rpc)]
    interface ITaggrNftRelay {
        function initialize(
            string projectName,
            address owner,
            address distributor,
            address nftContract,
            address nftHolder
        ) external;
        function mapTokens(uint256[] tokenIds, uint256[] nftTokenIds) external;
    }

    #[sol(rpc)]
    interface IFakeUSDC {
        function mint(address receiver, uint256 amount) external;
    }

    #[sol(rpc)]
    interface IERC721Enumerable {
        function balanceOf(address owner) external view returns (uint256);
        function tokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256);
        function tokenURI(uint256 tokenId) external view returns (string);
    }
}

#[cfg(test)]
mod tests {
    use alloy::{primitives::Address, sol_types::SolCall};

    use super::*;

    #[test]
    fn test_initialize_calldata() {
        let calldata = initializeCall { initiator: Address::repeat_byte(0xab) }.abi_encode();

        // selector of `initialize(address)`
        assert_eq!(&calldata[..4], &[0xc4, 0xd6, 0x6d, 0xe8]);
        assert_eq!(calldata.len(), 4 + 32);
        assert_eq!(&calldata[16..36], Address::repeat_byte(0xab).as_slice());
    }
}
